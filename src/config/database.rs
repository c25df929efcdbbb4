//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions, and creation is idempotent so the binary can run
//! against an existing database file.

use crate::entities::{
    AttendanceDay, CashRegister, Effectiveness, Employee, EmployeeEvent, LedgerPosting,
    SalarySlip, TransferOrder, TransferOrderItem, effectiveness, salary_slip,
    transfer_order_item,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement, TableCreateStatement},
};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/payroll.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

fn table_for<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    statement
}

/// Unique `(employee_id, month, year)` indexes: one record, slip and
/// transfer item per period key.
fn period_key_indexes() -> [IndexCreateStatement; 3] {
    [
        Index::create()
            .name("idx_effectiveness_records_period_key")
            .table(Effectiveness)
            .col(effectiveness::Column::EmployeeId)
            .col(effectiveness::Column::Month)
            .col(effectiveness::Column::Year)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_salary_slips_period_key")
            .table(SalarySlip)
            .col(salary_slip::Column::EmployeeId)
            .col(salary_slip::Column::Month)
            .col(salary_slip::Column::Year)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_transfer_order_items_period_key")
            .table(TransferOrderItem)
            .col(transfer_order_item::Column::EmployeeId)
            .col(transfer_order_item::Column::Month)
            .col(transfer_order_item::Column::Year)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

/// Creates all payroll tables and period-key indexes that do not exist yet.
///
/// Parent tables are created before the tables that reference them.
pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        table_for(&schema, Employee),
        table_for(&schema, EmployeeEvent),
        table_for(&schema, Effectiveness),
        table_for(&schema, AttendanceDay),
        table_for(&schema, SalarySlip),
        table_for(&schema, CashRegister),
        table_for(&schema, TransferOrder),
        table_for(&schema, TransferOrderItem),
        table_for(&schema, LedgerPosting),
    ];

    for table in &tables {
        db.execute(builder.build(table)).await?;
    }
    for index in &period_key_indexes() {
        db.execute(builder.build(index)).await?;
    }

    Ok(())
}
