//! Shared test utilities for the payroll engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test employees and registers with sensible defaults.

use crate::{
    config::PayrollConfig,
    core::{
        effectiveness::{AttendanceSheet, process_effectiveness},
        employee::{Dismissal, NewEmployee, create_employee, dismiss_employee},
        ledger::create_cash_register,
        period::{Period, PeriodKey},
    },
    entities::{EmploymentStatus, cash_register, effectiveness, employee},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Asserts two amounts are equal within a relative tolerance.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-6 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

/// March 2025, the period most tests run in.
#[must_use]
pub fn test_period() -> Period {
    Period::new(3, 2025).unwrap()
}

/// Last day of [`test_period`].
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
}

#[must_use]
pub fn test_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap()
}

#[must_use]
pub fn test_config() -> PayrollConfig {
    PayrollConfig::for_company("500000000", "Kwanza Test Lda")
}

/// An unsaved employee with only a base salary set.
///
/// # Defaults
/// * all subsidies, adjustments and penalties: 0.0
/// * `status`: Active
#[must_use]
pub fn employee_model(id: i64, base_salary: f64) -> employee::Model {
    employee::Model {
        id,
        idnf: None,
        name: format!("Employee {id}"),
        role: "Operador".to_string(),
        base_salary,
        complement_salary: 0.0,
        subsidy_food: 0.0,
        subsidy_transport: 0.0,
        subsidy_housing: 0.0,
        subsidy_family: 0.0,
        subsidy_vacation: 0.0,
        subsidy_christmas: 0.0,
        salary_adjustments: 0.0,
        penalties: 0.0,
        status: EmploymentStatus::Active,
        dismissal_date: None,
        dismissed_by: None,
        dismissal_reason: None,
        dismissal_occurrence: None,
        rehire_date: None,
        rehire_orderer: None,
        rehire_reason: None,
        bank_name: None,
        bank_account: None,
        iban: None,
        admission_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
    }
}

/// Hires a test employee with no subsidies or banking details.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    name: &str,
    base_salary: f64,
) -> Result<employee::Model> {
    create_employee(
        db,
        NewEmployee {
            name: name.to_string(),
            role: "Operador".to_string(),
            base_salary,
            admission_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
            ..NewEmployee::default()
        },
    )
    .await
}

/// Hires a test employee with a standing food subsidy.
pub async fn create_custom_employee(
    db: &DatabaseConnection,
    name: &str,
    base_salary: f64,
    subsidy_food: f64,
) -> Result<employee::Model> {
    create_employee(
        db,
        NewEmployee {
            name: name.to_string(),
            role: "Técnico".to_string(),
            base_salary,
            subsidy_food,
            admission_date: NaiveDate::from_ymd_opt(2021, 9, 1).unwrap(),
            ..NewEmployee::default()
        },
    )
    .await
}

/// Hires a 100,000 employee with full banking details and IDNF `H-001`.
pub async fn create_banked_employee(
    db: &DatabaseConnection,
    name: &str,
    bank_name: &str,
    bank_account: &str,
    iban: &str,
) -> Result<employee::Model> {
    create_employee(
        db,
        NewEmployee {
            idnf: Some("H-001".to_string()),
            name: name.to_string(),
            role: "Contabilista".to_string(),
            base_salary: 100_000.0,
            bank_name: Some(bank_name.to_string()),
            bank_account: Some(bank_account.to_string()),
            iban: Some(iban.to_string()),
            admission_date: NaiveDate::from_ymd_opt(2019, 2, 1).unwrap(),
            ..NewEmployee::default()
        },
    )
    .await
}

/// Processes effectiveness with an empty sheet (no absences).
pub async fn record_test_effectiveness(
    db: &DatabaseConnection,
    key: PeriodKey,
) -> Result<effectiveness::Model> {
    process_effectiveness(db, key, &AttendanceSheet::default()).await
}

pub async fn dismiss_test_employee(
    db: &DatabaseConnection,
    employee_id: i64,
) -> Result<employee::Model> {
    dismiss_employee(
        db,
        employee_id,
        Dismissal {
            date: test_date(),
            orderer: "Direcção".to_string(),
            reason: "Fim de contrato".to_string(),
            occurrence: None,
        },
    )
    .await
}

/// Forces a status without going through the lifecycle commands.
pub async fn set_test_status(
    db: &DatabaseConnection,
    employee_id: i64,
    status: EmploymentStatus,
) -> Result<employee::Model> {
    let employee = crate::core::employee::get_employee(db, employee_id)
        .await?
        .unwrap();
    let mut model = employee.into_active_model();
    model.status = Set(status);
    Ok(model.update(db).await?)
}

pub async fn create_test_cash_register(
    db: &DatabaseConnection,
    balance: f64,
) -> Result<cash_register::Model> {
    create_cash_register(db, "Caixa Geral", balance).await
}
