//! Attendance capture - Finalising effectiveness for one period key.
//!
//! An operator fills an [`AttendanceSheet`] (a classification per calendar
//! day, optional overtime and lost hours, a manual absence count and manual
//! food/transport subsidies) and submits it. The sheet is validated as a whole
//! before anything is written; the record and its days are then stored in one
//! transaction, moving the key from `Open` to `EffectivenessProcessed`.

use crate::{
    core::period::{PeriodKey, PeriodState, period_state},
    entities::{AttendanceDay, Employee, attendance_day, effectiveness},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub use crate::entities::DayKind;

/// One captured day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayEntry {
    pub kind: DayKind,
    pub overtime_hours: f64,
    pub lost_hours: f64,
}

impl DayEntry {
    #[must_use]
    pub const fn new(kind: DayKind) -> Self {
        Self {
            kind,
            overtime_hours: 0.0,
            lost_hours: 0.0,
        }
    }
}

/// Attendance input for one employee and month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceSheet {
    /// Entries keyed by day of month
    pub days: BTreeMap<u32, DayEntry>,
    /// Replaces the unjustified-absence tally when present
    pub manual_absence_days: Option<i32>,
    pub food_subsidy: Option<f64>,
    pub transport_subsidy: Option<f64>,
}

/// Number of days in a month, or `None` for an invalid month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

impl AttendanceSheet {
    /// Classifies a single day, keeping any hours already entered for it.
    pub fn mark(&mut self, day: u32, kind: DayKind) -> &mut Self {
        self.days
            .entry(day)
            .and_modify(|entry| entry.kind = kind)
            .or_insert_with(|| DayEntry::new(kind));
        self
    }

    /// Classifies every day of the month the same way.
    pub fn fill(&mut self, year: i32, month: u32, kind: DayKind) -> &mut Self {
        for day in 1..=days_in_month(year, month).unwrap_or(0) {
            self.mark(day, kind);
        }
        self
    }

    /// Days classified as `kind`.
    #[must_use]
    pub fn count(&self, kind: DayKind) -> i32 {
        let count = self.days.values().filter(|entry| entry.kind == kind).count();
        i32::try_from(count).unwrap_or(i32::MAX)
    }

    /// Absence days this sheet will deduct.
    #[must_use]
    pub fn absence_days(&self) -> i32 {
        self.manual_absence_days
            .unwrap_or_else(|| self.count(DayKind::UnjustifiedAbsence))
    }

    /// Checks every field of the sheet against the period it is submitted for.
    pub fn validate(&self, key: PeriodKey) -> Result<()> {
        let month_days = days_in_month(key.year(), key.month())
            .ok_or_else(|| Error::validation(format!("Invalid period {key}")))?;

        for (day, entry) in &self.days {
            if *day == 0 || *day > month_days {
                return Err(Error::validation(format!(
                    "Day {day} is outside {:02}/{} ({month_days} days)",
                    key.month(),
                    key.year()
                )));
            }
            for (field, hours) in [
                ("overtime_hours", entry.overtime_hours),
                ("lost_hours", entry.lost_hours),
            ] {
                if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
                    return Err(Error::validation(format!(
                        "{field} for day {day} must be between 0 and 24, got {hours}"
                    )));
                }
            }
        }

        if let Some(days) = self.manual_absence_days
            && !u32::try_from(days).is_ok_and(|days| days <= month_days)
        {
            return Err(Error::validation(format!(
                "Manual absence days must be between 0 and {month_days}, got {days}"
            )));
        }

        for (field, amount) in [
            ("food_subsidy", self.food_subsidy),
            ("transport_subsidy", self.transport_subsidy),
        ] {
            if let Some(amount) = amount
                && (!amount.is_finite() || amount < 0.0)
            {
                return Err(Error::validation(format!(
                    "{field} must be a non-negative amount, got {amount}"
                )));
            }
        }

        Ok(())
    }
}

/// Writes an effectiveness record and its days. The caller owns the state check.
pub(crate) async fn insert_effectiveness<C: ConnectionTrait>(
    db: &C,
    key: PeriodKey,
    sheet: &AttendanceSheet,
) -> Result<effectiveness::Model> {
    let record = effectiveness::ActiveModel {
        employee_id: Set(key.employee_id),
        month: Set(key.month()),
        year: Set(key.year()),
        manual_absence_days: Set(sheet.manual_absence_days),
        unjustified_absence_days: Set(sheet.count(DayKind::UnjustifiedAbsence)),
        justified_absence_days: Set(sheet.count(DayKind::JustifiedAbsence)),
        food_subsidy_override: Set(sheet.food_subsidy),
        transport_subsidy_override: Set(sheet.transport_subsidy),
        processed_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if !sheet.days.is_empty() {
        let days = sheet.days.iter().map(|(day, entry)| attendance_day::ActiveModel {
            effectiveness_id: Set(record.id),
            day: Set(*day),
            kind: Set(entry.kind),
            overtime_hours: Set(entry.overtime_hours),
            lost_hours: Set(entry.lost_hours),
            ..Default::default()
        });
        AttendanceDay::insert_many(days).exec(db).await?;
    }

    Ok(record)
}

/// Finalises attendance for a period key.
///
/// # Errors
/// - [`Error::Validation`] if the sheet is malformed
/// - [`Error::EmployeeNotFound`] if the employee does not exist
/// - [`Error::PreconditionViolation`] if the employee is terminated or the
///   key is not `Open` (clear it first to capture again)
#[instrument(skip(db, sheet))]
pub async fn process_effectiveness(
    db: &DatabaseConnection,
    key: PeriodKey,
    sheet: &AttendanceSheet,
) -> Result<effectiveness::Model> {
    sheet.validate(key)?;

    let txn = db.begin().await?;

    let employee = Employee::find_by_id(key.employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound {
            id: key.employee_id,
        })?;
    if employee.status.is_terminated() {
        return Err(Error::precondition(key, "employee has been terminated"));
    }

    let state = period_state(&txn, key).await?;
    if state != PeriodState::Open {
        return Err(Error::precondition(
            key,
            format!("effectiveness already processed (state {state:?})"),
        ));
    }

    let record = insert_effectiveness(&txn, key, sheet).await?;
    txn.commit().await?;

    info!(%key, absence_days = record.absence_days(), "effectiveness processed");
    Ok(record)
}

/// Loads the captured days of an effectiveness record, in day order.
pub async fn attendance_days<C: ConnectionTrait>(
    db: &C,
    effectiveness_id: i64,
) -> Result<Vec<attendance_day::Model>> {
    AttendanceDay::find()
        .filter(attendance_day::Column::EffectivenessId.eq(effectiveness_id))
        .order_by_asc(attendance_day::Column::Day)
        .all(db)
        .await
        .map_err(Into::into)
}
