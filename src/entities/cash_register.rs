//! Cash register entity - A terminal of the cash ledger that funds transfers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cash register database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_registers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, copied onto transfer orders
    pub name: String,
    /// Running balance in kwanzas
    pub balance: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One register has many postings
    #[sea_orm(has_many = "super::ledger_posting::Entity")]
    Postings,
}

impl Related<super::ledger_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
