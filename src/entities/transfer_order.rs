//! Transfer order entity - A batch bank-payment instruction for one period.
//!
//! An order and all of its items are written in one database transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Printed reference, e.g. `1250.1/15032025`
    pub reference: String,
    pub date: Date,
    pub total_amount: f64,
    pub total_count: i32,
    pub cash_register_id: i64,
    /// Register name at the time of the transfer
    pub cash_register_name: String,
    pub company_id: String,
    pub month: u32,
    pub year: i32,
    /// Human-readable period, e.g. `Março/2025`
    pub period: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transfer_order_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::ledger_posting::Entity")]
    Postings,
}

impl Related<super::transfer_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::ledger_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
