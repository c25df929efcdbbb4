//! Transfer order item entity - One paid employee inside a transfer order.
//!
//! The period columns are copied from the order so "is this period paid" is a
//! single lookup on this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transfer order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfer_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transfer_order_id: i64,
    pub employee_id: i64,
    pub salary_slip_id: i64,
    pub month: u32,
    pub year: i32,
    pub employee_name: String,
    pub bank_name: String,
    pub account_number: String,
    pub iban: String,
    pub gross_amount: f64,
    /// INSS + IRT + advances
    pub discounts: f64,
    /// Equals the net total of the referenced slip
    pub amount: f64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transfer_order::Entity",
        from = "Column::TransferOrderId",
        to = "super::transfer_order::Column::Id"
    )]
    TransferOrder,
}

impl Related<super::transfer_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
