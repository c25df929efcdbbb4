//! Ledger posting entity - One cash movement written by a transfer commit.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger posting database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_postings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cash_register_id: i64,
    pub transfer_order_id: i64,
    pub employee_id: i64,
    /// Tenant the movement belongs to
    pub company_id: String,
    pub posted_on: Date,
    /// Outflow amount, always positive
    pub amount: f64,
    pub description: String,
    pub reference: String,
    pub operator_name: String,
    /// Module that issued the posting (e.g. `"RH"`)
    pub origin: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_register::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_register::Column::Id"
    )]
    CashRegister,
    #[sea_orm(
        belongs_to = "super::transfer_order::Entity",
        from = "Column::TransferOrderId",
        to = "super::transfer_order::Column::Id"
    )]
    TransferOrder,
}

impl Related<super::cash_register::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegister.def()
    }
}

impl Related<super::transfer_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
