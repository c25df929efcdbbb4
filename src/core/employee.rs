//! Employee business logic - Hiring, pay changes and lifecycle events.
//!
//! Payroll only reads employees. This module is the HR side: it creates
//! employees, applies validated batches of pay-field changes, and records
//! dismissals and readmissions in the append-only event history.

use crate::{
    entities::{Employee, EmployeeAction, EmployeeEvent, EmploymentStatus, employee, employee_event},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Data needed to hire an employee.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEmployee {
    pub idnf: Option<String>,
    pub name: String,
    pub role: String,
    pub base_salary: f64,
    pub complement_salary: f64,
    pub subsidy_food: f64,
    pub subsidy_transport: f64,
    pub subsidy_housing: f64,
    pub subsidy_family: f64,
    pub subsidy_vacation: f64,
    pub subsidy_christmas: f64,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub iban: Option<String>,
    pub admission_date: NaiveDate,
}

/// A batch of pay-field edits submitted together.
///
/// Every `Some` field is validated before anything is written; one bad field
/// rejects the whole batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeePayChanges {
    pub base_salary: Option<f64>,
    pub complement_salary: Option<f64>,
    pub subsidy_food: Option<f64>,
    pub subsidy_transport: Option<f64>,
    pub subsidy_housing: Option<f64>,
    pub subsidy_family: Option<f64>,
    pub subsidy_vacation: Option<f64>,
    pub subsidy_christmas: Option<f64>,
    pub salary_adjustments: Option<f64>,
    pub penalties: Option<f64>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,
    pub iban: Option<String>,
}

/// Details of a dismissal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissal {
    pub date: NaiveDate,
    pub orderer: String,
    pub reason: String,
    pub occurrence: Option<String>,
}

/// Details of a readmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readmission {
    pub date: NaiveDate,
    pub orderer: String,
    pub reason: String,
}

fn require_amount(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(value)
}

fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Retrieves an employee by id.
pub async fn get_employee<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
) -> Result<Option<employee::Model>> {
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all employees, ordered by name.
pub async fn list_employees<C: ConnectionTrait>(db: &C) -> Result<Vec<employee::Model>> {
    Employee::find()
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Hires an employee with status `Active` and no standing adjustments.
#[instrument(skip(db, new), fields(name = %new.name))]
pub async fn create_employee(db: &DatabaseConnection, new: NewEmployee) -> Result<employee::Model> {
    let model = employee::ActiveModel {
        idnf: Set(new.idnf),
        name: Set(require_text("name", &new.name)?),
        role: Set(new.role.trim().to_string()),
        base_salary: Set(require_amount("base_salary", new.base_salary)?),
        complement_salary: Set(require_amount("complement_salary", new.complement_salary)?),
        subsidy_food: Set(require_amount("subsidy_food", new.subsidy_food)?),
        subsidy_transport: Set(require_amount("subsidy_transport", new.subsidy_transport)?),
        subsidy_housing: Set(require_amount("subsidy_housing", new.subsidy_housing)?),
        subsidy_family: Set(require_amount("subsidy_family", new.subsidy_family)?),
        subsidy_vacation: Set(require_amount("subsidy_vacation", new.subsidy_vacation)?),
        subsidy_christmas: Set(require_amount("subsidy_christmas", new.subsidy_christmas)?),
        salary_adjustments: Set(0.0),
        penalties: Set(0.0),
        status: Set(EmploymentStatus::Active),
        dismissal_date: Set(None),
        dismissed_by: Set(None),
        dismissal_reason: Set(None),
        dismissal_occurrence: Set(None),
        rehire_date: Set(None),
        rehire_orderer: Set(None),
        rehire_reason: Set(None),
        bank_name: Set(new.bank_name),
        bank_account: Set(new.bank_account),
        iban: Set(new.iban),
        admission_date: Set(new.admission_date),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(employee_id = created.id, "employee created");
    Ok(created)
}

/// Applies a batch of pay-field changes to an employee.
///
/// # Errors
/// - [`Error::Validation`] if any amount is negative or not finite
///   (adjustments and penalties only need to be finite)
/// - [`Error::EmployeeNotFound`] if the employee does not exist
/// - [`Error::Validation`] if the employee is terminated
#[instrument(skip(db, changes))]
pub async fn apply_pay_changes(
    db: &DatabaseConnection,
    employee_id: i64,
    changes: EmployeePayChanges,
) -> Result<employee::Model> {
    let amounts = [
        ("base_salary", changes.base_salary),
        ("complement_salary", changes.complement_salary),
        ("subsidy_food", changes.subsidy_food),
        ("subsidy_transport", changes.subsidy_transport),
        ("subsidy_housing", changes.subsidy_housing),
        ("subsidy_family", changes.subsidy_family),
        ("subsidy_vacation", changes.subsidy_vacation),
        ("subsidy_christmas", changes.subsidy_christmas),
    ];
    for (field, value) in amounts {
        if let Some(value) = value {
            require_amount(field, value)?;
        }
    }
    for (field, value) in [
        ("salary_adjustments", changes.salary_adjustments),
        ("penalties", changes.penalties),
    ] {
        if let Some(value) = value
            && !value.is_finite()
        {
            return Err(Error::validation(format!("{field} must be finite, got {value}")));
        }
    }

    let txn = db.begin().await?;
    let current = Employee::find_by_id(employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })?;
    if current.status.is_terminated() {
        return Err(Error::validation(format!(
            "Employee {employee_id} is terminated and cannot be edited"
        )));
    }

    let mut model: employee::ActiveModel = current.into();
    if let Some(value) = changes.base_salary {
        model.base_salary = Set(value);
    }
    if let Some(value) = changes.complement_salary {
        model.complement_salary = Set(value);
    }
    if let Some(value) = changes.subsidy_food {
        model.subsidy_food = Set(value);
    }
    if let Some(value) = changes.subsidy_transport {
        model.subsidy_transport = Set(value);
    }
    if let Some(value) = changes.subsidy_housing {
        model.subsidy_housing = Set(value);
    }
    if let Some(value) = changes.subsidy_family {
        model.subsidy_family = Set(value);
    }
    if let Some(value) = changes.subsidy_vacation {
        model.subsidy_vacation = Set(value);
    }
    if let Some(value) = changes.subsidy_christmas {
        model.subsidy_christmas = Set(value);
    }
    if let Some(value) = changes.salary_adjustments {
        model.salary_adjustments = Set(value);
    }
    if let Some(value) = changes.penalties {
        model.penalties = Set(value);
    }
    if changes.bank_name.is_some() {
        model.bank_name = Set(changes.bank_name);
    }
    if changes.bank_account.is_some() {
        model.bank_account = Set(changes.bank_account);
    }
    if changes.iban.is_some() {
        model.iban = Set(changes.iban);
    }

    let updated = model.update(&txn).await?;
    txn.commit().await?;
    info!(employee_id, "pay fields updated");
    Ok(updated)
}

async fn record_event<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
    date: NaiveDate,
    action: EmployeeAction,
    reason: String,
    orderer: String,
) -> Result<()> {
    employee_event::ActiveModel {
        employee_id: Set(employee_id),
        date: Set(date),
        action: Set(action),
        reason: Set(reason),
        orderer: Set(orderer),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Dismisses an employee, blocking all further payroll processing.
#[instrument(skip(db, dismissal))]
pub async fn dismiss_employee(
    db: &DatabaseConnection,
    employee_id: i64,
    dismissal: Dismissal,
) -> Result<employee::Model> {
    let orderer = require_text("orderer", &dismissal.orderer)?;
    let reason = require_text("reason", &dismissal.reason)?;

    let txn = db.begin().await?;
    let current = Employee::find_by_id(employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })?;
    if current.status.is_terminated() {
        return Err(Error::validation(format!(
            "Employee {employee_id} is already terminated"
        )));
    }

    let mut model: employee::ActiveModel = current.into();
    model.status = Set(EmploymentStatus::Terminated);
    model.dismissal_date = Set(Some(dismissal.date));
    model.dismissed_by = Set(Some(orderer.clone()));
    model.dismissal_reason = Set(Some(reason.clone()));
    model.dismissal_occurrence = Set(dismissal.occurrence);
    let updated = model.update(&txn).await?;

    record_event(
        &txn,
        employee_id,
        dismissal.date,
        EmployeeAction::Dismissed,
        reason,
        orderer,
    )
    .await?;
    txn.commit().await?;

    info!(employee_id, "employee dismissed");
    Ok(updated)
}

/// Readmits a terminated employee.
#[instrument(skip(db, readmission))]
pub async fn readmit_employee(
    db: &DatabaseConnection,
    employee_id: i64,
    readmission: Readmission,
) -> Result<employee::Model> {
    let orderer = require_text("orderer", &readmission.orderer)?;
    let reason = require_text("reason", &readmission.reason)?;

    let txn = db.begin().await?;
    let current = Employee::find_by_id(employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })?;
    if !current.status.is_terminated() {
        return Err(Error::validation(format!(
            "Employee {employee_id} is not terminated"
        )));
    }

    let mut model: employee::ActiveModel = current.into();
    model.status = Set(EmploymentStatus::Readmitted);
    model.dismissal_date = Set(None);
    model.rehire_date = Set(Some(readmission.date));
    model.rehire_orderer = Set(Some(orderer.clone()));
    model.rehire_reason = Set(Some(reason.clone()));
    let updated = model.update(&txn).await?;

    record_event(
        &txn,
        employee_id,
        readmission.date,
        EmployeeAction::Readmitted,
        reason,
        orderer,
    )
    .await?;
    txn.commit().await?;

    info!(employee_id, "employee readmitted");
    Ok(updated)
}

/// Lifecycle history of an employee, oldest first.
pub async fn employee_history<C: ConnectionTrait>(
    db: &C,
    employee_id: i64,
) -> Result<Vec<employee_event::Model>> {
    EmployeeEvent::find()
        .filter(employee_event::Column::EmployeeId.eq(employee_id))
        .order_by_asc(employee_event::Column::Date)
        .order_by_asc(employee_event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_employee_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_employee(
            &db,
            NewEmployee {
                name: "   ".to_string(),
                base_salary: 100_000.0,
                admission_date: test_date(),
                ..NewEmployee::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_employee(
            &db,
            NewEmployee {
                name: "Ana".to_string(),
                base_salary: -5.0,
                admission_date: test_date(),
                ..NewEmployee::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(list_employees(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_employee_integration() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "  Ana Lopes ", 100_000.0).await?;

        assert_eq!(employee.name, "Ana Lopes");
        assert_eq!(employee.status, EmploymentStatus::Active);
        assert!(employee.status.is_active());

        let found = get_employee(&db, employee.id).await?.unwrap();
        assert_eq!(found, employee);
        assert!(get_employee(&db, 999).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_pay_changes_is_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Bruno Neto", 100_000.0).await?;

        let rejected = apply_pay_changes(
            &db,
            employee.id,
            EmployeePayChanges {
                base_salary: Some(150_000.0),
                subsidy_food: Some(-1.0),
                ..EmployeePayChanges::default()
            },
        )
        .await;
        assert!(matches!(rejected, Err(Error::Validation { .. })));
        let unchanged = get_employee(&db, employee.id).await?.unwrap();
        assert_close(unchanged.base_salary, 100_000.0);

        let updated = apply_pay_changes(
            &db,
            employee.id,
            EmployeePayChanges {
                base_salary: Some(150_000.0),
                subsidy_food: Some(12_000.0),
                penalties: Some(2_500.0),
                iban: Some("AO06004000001234567890123".to_string()),
                ..EmployeePayChanges::default()
            },
        )
        .await?;
        assert_close(updated.base_salary, 150_000.0);
        assert_close(updated.subsidy_food, 12_000.0);
        assert_close(updated.penalties, 2_500.0);
        assert_close(updated.subsidy_transport, 0.0);
        assert_eq!(updated.iban.as_deref(), Some("AO06004000001234567890123"));

        Ok(())
    }

    #[tokio::test]
    async fn test_terminated_employee_cannot_be_edited() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Carla Dias", 100_000.0).await?;
        dismiss_test_employee(&db, employee.id).await?;

        let result = apply_pay_changes(
            &db,
            employee.id,
            EmployeePayChanges {
                base_salary: Some(1.0),
                ..EmployeePayChanges::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_dismiss_and_readmit() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Daniel Sousa", 100_000.0).await?;
        let dismissed_on = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let readmitted_on = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let dismissed = dismiss_employee(
            &db,
            employee.id,
            Dismissal {
                date: dismissed_on,
                orderer: "Direcção Geral".to_string(),
                reason: "Abandono".to_string(),
                occurrence: None,
            },
        )
        .await?;
        assert_eq!(dismissed.status, EmploymentStatus::Terminated);
        assert_eq!(dismissed.dismissal_date, Some(dismissed_on));
        assert_eq!(dismissed.dismissed_by.as_deref(), Some("Direcção Geral"));

        let readmitted = readmit_employee(
            &db,
            employee.id,
            Readmission {
                date: readmitted_on,
                orderer: "Direcção Geral".to_string(),
                reason: "Recurso aceite".to_string(),
            },
        )
        .await?;
        assert_eq!(readmitted.status, EmploymentStatus::Readmitted);
        assert_eq!(readmitted.dismissal_date, None);
        assert_eq!(readmitted.rehire_date, Some(readmitted_on));
        // Dismissal metadata other than the date is kept for the record
        assert_eq!(readmitted.dismissal_reason.as_deref(), Some("Abandono"));

        let history = employee_history(&db, employee.id).await?;
        let actions: Vec<EmployeeAction> = history.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![EmployeeAction::Dismissed, EmployeeAction::Readmitted]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_dismissal_requires_orderer_and_reason() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Eva Costa", 100_000.0).await?;

        let result = dismiss_employee(
            &db,
            employee.id,
            Dismissal {
                date: test_date(),
                orderer: String::new(),
                reason: "Fim de contrato".to_string(),
                occurrence: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(employee_history(&db, employee.id).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_readmit_active_employee_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_test_employee(&db, "Filipe Ramos", 100_000.0).await?;

        let result = readmit_employee(
            &db,
            employee.id,
            Readmission {
                date: test_date(),
                orderer: "RH".to_string(),
                reason: "n/a".to_string(),
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[test]
    fn test_status_predicates() {
        assert!(EmploymentStatus::Active.is_active());
        assert!(EmploymentStatus::Readmitted.is_active());
        assert!(!EmploymentStatus::OnLeave.is_active());
        assert!(!EmploymentStatus::OnLeave.is_terminated());
        assert!(EmploymentStatus::Terminated.is_terminated());
        assert!(!EmploymentStatus::Terminated.is_active());
    }
}
