//! Cash ledger - Cash registers and the postings that debit them.
//!
//! Balance changes use a single `UPDATE ... SET balance = balance + delta`
//! statement so concurrent writers never lose an update.

use crate::{
    config::PayrollConfig,
    entities::{CashRegister, LedgerPosting, cash_register, ledger_posting},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// An outflow to record against a register.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPosting {
    pub cash_register_id: i64,
    pub transfer_order_id: i64,
    pub employee_id: i64,
    pub posted_on: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub reference: String,
}

/// Creates a cash register with an opening balance.
pub async fn create_cash_register<C: ConnectionTrait>(
    db: &C,
    name: &str,
    opening_balance: f64,
) -> Result<cash_register::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Cash register name cannot be empty"));
    }
    if !opening_balance.is_finite() {
        return Err(Error::validation(format!(
            "Opening balance must be finite, got {opening_balance}"
        )));
    }

    cash_register::ActiveModel {
        name: Set(name.trim().to_string()),
        balance: Set(opening_balance),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn get_cash_register<C: ConnectionTrait>(
    db: &C,
    cash_register_id: i64,
) -> Result<Option<cash_register::Model>> {
    CashRegister::find_by_id(cash_register_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates the configured cash registers when the database has none.
///
/// Returns how many registers were created.
pub async fn seed_cash_registers<C: ConnectionTrait>(
    db: &C,
    config: &PayrollConfig,
) -> Result<usize> {
    if CashRegister::find().count(db).await? > 0 {
        return Ok(0);
    }
    for register in &config.cash_registers {
        create_cash_register(db, &register.name, register.opening_balance).await?;
    }
    info!(count = config.cash_registers.len(), "cash registers seeded");
    Ok(config.cash_registers.len())
}

/// Atomically adds `amount_delta` to a register's balance and returns the register.
pub async fn update_register_balance_atomic<C: ConnectionTrait>(
    db: &C,
    cash_register_id: i64,
    amount_delta: f64,
) -> Result<cash_register::Model> {
    let result = CashRegister::update_many()
        .col_expr(
            cash_register::Column::Balance,
            Expr::col(cash_register::Column::Balance).add(amount_delta),
        )
        .filter(cash_register::Column::Id.eq(cash_register_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::CashRegisterNotFound {
            id: cash_register_id,
        });
    }

    get_cash_register(db, cash_register_id)
        .await?
        .ok_or(Error::CashRegisterNotFound {
            id: cash_register_id,
        })
}

/// Writes an outflow posting and debits its register.
pub async fn post_outflow<C: ConnectionTrait>(
    db: &C,
    config: &PayrollConfig,
    posting: NewPosting,
) -> Result<ledger_posting::Model> {
    let model = ledger_posting::ActiveModel {
        cash_register_id: Set(posting.cash_register_id),
        transfer_order_id: Set(posting.transfer_order_id),
        employee_id: Set(posting.employee_id),
        company_id: Set(config.company.id.clone()),
        posted_on: Set(posting.posted_on),
        amount: Set(posting.amount),
        description: Set(posting.description),
        reference: Set(posting.reference),
        operator_name: Set(config.transfer.operator_name.clone()),
        origin: Set(config.transfer.origin.clone()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    update_register_balance_atomic(db, posting.cash_register_id, -posting.amount).await?;
    Ok(model)
}

/// Postings against a register, oldest first.
pub async fn postings_for_register<C: ConnectionTrait>(
    db: &C,
    cash_register_id: i64,
) -> Result<Vec<ledger_posting::Model>> {
    LedgerPosting::find()
        .filter(ledger_posting::Column::CashRegisterId.eq(cash_register_id))
        .order_by_asc(ledger_posting::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
