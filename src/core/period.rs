//! Period processing state - The per-(employee, month, year) state machine.
//!
//! A period key moves `Open -> EffectivenessProcessed -> SalaryProcessed -> Paid`.
//! State is never stored; it is derived from which records exist for the key:
//! an effectiveness record, a salary slip, and a transfer order item.
//!
//! Single-key transitions run in one database transaction and are rejected
//! with [`Error::PreconditionViolation`] when attempted out of order. Bulk
//! operations are best-effort: members that do not qualify are excluded and
//! reported in [`BulkOutcome::skipped`], never raised as errors. Each bulk
//! operation is still one transaction, so a storage failure leaves nothing
//! half-applied.

use crate::{
    core::{
        effectiveness::{AttendanceSheet, insert_effectiveness},
        slip::{SlipOverrides, compute_salary},
    },
    entities::{
        AttendanceDay, Effectiveness, Employee, SalarySlip, TransferOrderItem, attendance_day,
        effectiveness, employee, salary_slip, transfer_order_item,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use std::{collections::BTreeSet, fmt};
use tracing::{debug, info, instrument, warn};

/// Portuguese month names used in period labels.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// A payroll month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    month: u32,
    year: i32,
}

impl Period {
    /// Creates a period, rejecting months outside 1..=12.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::validation(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { month, year })
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Portuguese month name, e.g. `Março`
    #[must_use]
    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Label printed on transfer orders, e.g. `Março/2025`
    #[must_use]
    pub fn label(self) -> String {
        format!("{}/{}", self.month_name(), self.year)
    }

    #[must_use]
    pub const fn key(self, employee_id: i64) -> PeriodKey {
        PeriodKey {
            employee_id,
            period: self,
        }
    }
}

/// The (employee, month, year) tuple that scopes one payroll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub employee_id: i64,
    pub period: Period,
}

impl PeriodKey {
    pub fn new(employee_id: i64, month: u32, year: i32) -> Result<Self> {
        Ok(Period::new(month, year)?.key(employee_id))
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.period.month
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.period.year
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "employee {} {:02}/{}",
            self.employee_id,
            self.month(),
            self.year()
        )
    }
}

/// Processing state of one period key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodState {
    /// No effectiveness record
    Open,
    /// Attendance finalised, no salary slip
    EffectivenessProcessed,
    /// Salary slip exists
    SalaryProcessed,
    /// Slip net amount is part of a committed transfer order; terminal
    Paid,
}

impl PeriodState {
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Why a member of a bulk selection was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmployeeNotFound,
    Terminated,
    /// The transition does not apply from the member's current state
    NotApplicable(PeriodState),
}

/// A bulk-selection member that was excluded by policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skipped {
    pub employee_id: i64,
    pub reason: SkipReason,
}

/// Result of a bulk operation: how many were selected and which were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Distinct employees in the selection
    pub attempted: usize,
    /// Employees the operation was applied to, in ascending id order
    pub applied: Vec<i64>,
    pub skipped: Vec<Skipped>,
}

impl BulkOutcome {
    fn new(attempted: usize) -> Self {
        Self {
            attempted,
            ..Self::default()
        }
    }

    fn skip(&mut self, employee_id: i64, reason: SkipReason) {
        debug!(employee_id, ?reason, "excluded from bulk operation");
        self.skipped.push(Skipped {
            employee_id,
            reason,
        });
    }

    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

fn distinct(employee_ids: &[i64]) -> BTreeSet<i64> {
    employee_ids.iter().copied().collect()
}

/// Finds the effectiveness record for a period key.
pub async fn find_effectiveness<C: ConnectionTrait>(
    db: &C,
    key: PeriodKey,
) -> Result<Option<effectiveness::Model>> {
    Effectiveness::find()
        .filter(effectiveness::Column::EmployeeId.eq(key.employee_id))
        .filter(effectiveness::Column::Month.eq(key.month()))
        .filter(effectiveness::Column::Year.eq(key.year()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the salary slip for a period key.
pub async fn find_salary_slip<C: ConnectionTrait>(
    db: &C,
    key: PeriodKey,
) -> Result<Option<salary_slip::Model>> {
    SalarySlip::find()
        .filter(salary_slip::Column::EmployeeId.eq(key.employee_id))
        .filter(salary_slip::Column::Month.eq(key.month()))
        .filter(salary_slip::Column::Year.eq(key.year()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// True once the employee appears in any transfer order for the period.
pub async fn is_paid<C: ConnectionTrait>(db: &C, key: PeriodKey) -> Result<bool> {
    let count = TransferOrderItem::find()
        .filter(transfer_order_item::Column::EmployeeId.eq(key.employee_id))
        .filter(transfer_order_item::Column::Month.eq(key.month()))
        .filter(transfer_order_item::Column::Year.eq(key.year()))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Derives the processing state of a period key from the stored records.
pub async fn period_state<C: ConnectionTrait>(db: &C, key: PeriodKey) -> Result<PeriodState> {
    if is_paid(db, key).await? {
        return Ok(PeriodState::Paid);
    }
    if find_salary_slip(db, key).await?.is_some() {
        return Ok(PeriodState::SalaryProcessed);
    }
    if find_effectiveness(db, key).await?.is_some() {
        return Ok(PeriodState::EffectivenessProcessed);
    }
    Ok(PeriodState::Open)
}

/// Lists every employee with the state of their period key, ordered by name.
pub async fn period_overview<C: ConnectionTrait>(
    db: &C,
    period: Period,
) -> Result<Vec<(employee::Model, PeriodState)>> {
    let employees = Employee::find()
        .order_by_asc(employee::Column::Name)
        .all(db)
        .await?;

    let mut overview = Vec::with_capacity(employees.len());
    for employee in employees {
        let state = period_state(db, period.key(employee.id)).await?;
        overview.push((employee, state));
    }
    Ok(overview)
}

async fn load_employee<C: ConnectionTrait>(db: &C, employee_id: i64) -> Result<employee::Model> {
    Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or(Error::EmployeeNotFound { id: employee_id })
}

/// Builds and stores the salary slip for a key in `EffectivenessProcessed`.
async fn build_slip<C: ConnectionTrait>(
    db: &C,
    employee: &employee::Model,
    key: PeriodKey,
    overrides: &SlipOverrides,
) -> Result<salary_slip::Model> {
    let record = find_effectiveness(db, key)
        .await?
        .ok_or_else(|| Error::precondition(key, "effectiveness has not been processed"))?;
    let breakdown = compute_salary(employee, &record, overrides)?;
    let slip = breakdown
        .to_slip(employee, key, chrono::Utc::now())
        .insert(db)
        .await?;
    Ok(slip)
}

/// Processes salary for one period key.
///
/// The key must be in [`PeriodState::EffectivenessProcessed`] and the employee
/// must not be terminated; anything else is a precondition violation and
/// nothing is written.
#[instrument(skip(db, overrides))]
pub async fn process_salary(
    db: &DatabaseConnection,
    key: PeriodKey,
    overrides: &SlipOverrides,
) -> Result<salary_slip::Model> {
    let txn = db.begin().await?;

    let employee = load_employee(&txn, key.employee_id).await?;
    match period_state(&txn, key).await? {
        PeriodState::EffectivenessProcessed => {}
        PeriodState::Open => {
            warn!(%key, "salary requested before effectiveness");
            return Err(Error::precondition(
                key,
                "effectiveness has not been processed",
            ));
        }
        PeriodState::SalaryProcessed => {
            return Err(Error::precondition(key, "salary has already been processed"));
        }
        PeriodState::Paid => {
            return Err(Error::precondition(key, "period has already been paid"));
        }
    }

    let slip = build_slip(&txn, &employee, key, overrides).await?;
    txn.commit().await?;

    info!(%key, net_total = slip.net_total, "salary processed");
    Ok(slip)
}

async fn delete_slip<C: ConnectionTrait>(db: &C, key: PeriodKey) -> Result<bool> {
    let result = SalarySlip::delete_many()
        .filter(salary_slip::Column::EmployeeId.eq(key.employee_id))
        .filter(salary_slip::Column::Month.eq(key.month()))
        .filter(salary_slip::Column::Year.eq(key.year()))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

async fn delete_effectiveness<C: ConnectionTrait>(db: &C, key: PeriodKey) -> Result<bool> {
    let Some(record) = find_effectiveness(db, key).await? else {
        return Ok(false);
    };
    delete_slip(db, key).await?;
    AttendanceDay::delete_many()
        .filter(attendance_day::Column::EffectivenessId.eq(record.id))
        .exec(db)
        .await?;
    record.delete(db).await?;
    Ok(true)
}

/// Deletes the effectiveness record of a key and, cascading, its salary slip.
///
/// Returns `false` when the key was already `Open`. Rejected for paid periods.
#[instrument(skip(db))]
pub async fn clear_effectiveness(db: &DatabaseConnection, key: PeriodKey) -> Result<bool> {
    let txn = db.begin().await?;

    if is_paid(&txn, key).await? {
        warn!(%key, "refusing to clear effectiveness of a paid period");
        return Err(Error::precondition(
            key,
            "paid periods cannot have effectiveness cleared",
        ));
    }

    let removed = delete_effectiveness(&txn, key).await?;
    txn.commit().await?;

    if removed {
        info!(%key, "effectiveness cleared");
    }
    Ok(removed)
}

/// Deletes only the salary slip of a key, leaving effectiveness processed.
///
/// Returns `false` when no slip existed. Rejected for paid periods.
#[instrument(skip(db))]
pub async fn clear_salary(db: &DatabaseConnection, key: PeriodKey) -> Result<bool> {
    let txn = db.begin().await?;

    if is_paid(&txn, key).await? {
        warn!(%key, "refusing to clear salary of a paid period");
        return Err(Error::precondition(
            key,
            "paid periods cannot have salary cleared",
        ));
    }

    let removed = delete_slip(&txn, key).await?;
    txn.commit().await?;

    if removed {
        info!(%key, "salary cleared");
    }
    Ok(removed)
}

/// Marks effectiveness processed for every eligible employee in the selection.
///
/// Terminated employees and keys that are not `Open` are excluded. Each
/// applied key gets an empty attendance sheet, i.e. no absences.
#[instrument(skip(db, employee_ids), fields(selected = employee_ids.len()))]
pub async fn mass_process_effectiveness(
    db: &DatabaseConnection,
    period: Period,
    employee_ids: &[i64],
) -> Result<BulkOutcome> {
    let selection = distinct(employee_ids);
    let mut outcome = BulkOutcome::new(selection.len());
    let txn = db.begin().await?;

    for employee_id in selection {
        let Some(employee) = Employee::find_by_id(employee_id).one(&txn).await? else {
            outcome.skip(employee_id, SkipReason::EmployeeNotFound);
            continue;
        };
        if employee.status.is_terminated() {
            outcome.skip(employee_id, SkipReason::Terminated);
            continue;
        }
        let key = period.key(employee_id);
        match period_state(&txn, key).await? {
            PeriodState::Open => {
                insert_effectiveness(&txn, key, &AttendanceSheet::default()).await?;
                outcome.applied.push(employee_id);
            }
            state => outcome.skip(employee_id, SkipReason::NotApplicable(state)),
        }
    }

    txn.commit().await?;
    info!(
        attempted = outcome.attempted,
        applied = outcome.applied_count(),
        "mass effectiveness processed"
    );
    Ok(outcome)
}

/// Processes salary for every eligible employee in the selection.
///
/// Employees that are terminated or whose key is not `EffectivenessProcessed`
/// are silently excluded; only the applied count matters to the operator.
#[instrument(skip(db, employee_ids), fields(selected = employee_ids.len()))]
pub async fn mass_process_salary(
    db: &DatabaseConnection,
    period: Period,
    employee_ids: &[i64],
) -> Result<BulkOutcome> {
    let selection = distinct(employee_ids);
    let mut outcome = BulkOutcome::new(selection.len());
    let overrides = SlipOverrides::default();
    let txn = db.begin().await?;

    for employee_id in selection {
        let Some(employee) = Employee::find_by_id(employee_id).one(&txn).await? else {
            outcome.skip(employee_id, SkipReason::EmployeeNotFound);
            continue;
        };
        if employee.status.is_terminated() {
            outcome.skip(employee_id, SkipReason::Terminated);
            continue;
        }
        let key = period.key(employee_id);
        match period_state(&txn, key).await? {
            PeriodState::EffectivenessProcessed => {
                build_slip(&txn, &employee, key, &overrides).await?;
                outcome.applied.push(employee_id);
            }
            state => outcome.skip(employee_id, SkipReason::NotApplicable(state)),
        }
    }

    txn.commit().await?;
    info!(
        attempted = outcome.attempted,
        applied = outcome.applied_count(),
        "mass salary processed"
    );
    Ok(outcome)
}

/// Clears effectiveness (and any salary slip) for every key in the selection.
///
/// Paid keys and keys that are already `Open` are excluded.
#[instrument(skip(db, employee_ids), fields(selected = employee_ids.len()))]
pub async fn mass_clear_effectiveness(
    db: &DatabaseConnection,
    period: Period,
    employee_ids: &[i64],
) -> Result<BulkOutcome> {
    let selection = distinct(employee_ids);
    let mut outcome = BulkOutcome::new(selection.len());
    let txn = db.begin().await?;

    for employee_id in selection {
        let key = period.key(employee_id);
        match period_state(&txn, key).await? {
            PeriodState::EffectivenessProcessed | PeriodState::SalaryProcessed => {
                delete_effectiveness(&txn, key).await?;
                outcome.applied.push(employee_id);
            }
            state => outcome.skip(employee_id, SkipReason::NotApplicable(state)),
        }
    }

    txn.commit().await?;
    info!(
        attempted = outcome.attempted,
        applied = outcome.applied_count(),
        "mass effectiveness cleared"
    );
    Ok(outcome)
}

/// Clears salary slips for every key in the selection, keeping effectiveness.
///
/// Only keys in `SalaryProcessed` are applied; paid keys are excluded.
#[instrument(skip(db, employee_ids), fields(selected = employee_ids.len()))]
pub async fn mass_clear_salary(
    db: &DatabaseConnection,
    period: Period,
    employee_ids: &[i64],
) -> Result<BulkOutcome> {
    let selection = distinct(employee_ids);
    let mut outcome = BulkOutcome::new(selection.len());
    let txn = db.begin().await?;

    for employee_id in selection {
        let key = period.key(employee_id);
        match period_state(&txn, key).await? {
            PeriodState::SalaryProcessed => {
                delete_slip(&txn, key).await?;
                outcome.applied.push(employee_id);
            }
            state => outcome.skip(employee_id, SkipReason::NotApplicable(state)),
        }
    }

    txn.commit().await?;
    info!(
        attempted = outcome.attempted,
        applied = outcome.applied_count(),
        "mass salary cleared"
    );
    Ok(outcome)
}
