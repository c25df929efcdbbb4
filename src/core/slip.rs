//! Salary slip builder - Turns pay inputs and attendance into a salary slip.
//!
//! The calculation is a pure function of resolved inputs: an employee, the
//! effectiveness record of the period, and optional per-slip overrides. The
//! same inputs always produce the same [`SalaryBreakdown`], and a stored slip
//! carries every line item so [`rederive`] can recompute its totals for audit.

use crate::{
    core::{
        deductions::{progressive_income_tax, social_security_contribution},
        period::PeriodKey,
    },
    entities::{effectiveness, employee, salary_slip},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::NotSet, Set};

/// Absence pro-ration always uses a 30-day month.
pub const PRORATION_DAYS: f64 = 30.0;

/// Per-period subsidy values that replace the employee's standing amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubsidyOverrides {
    pub food: Option<f64>,
    pub transport: Option<f64>,
    pub housing: Option<f64>,
    pub vacation: Option<f64>,
    pub christmas: Option<f64>,
    pub family: Option<f64>,
}

/// Manual values entered when building one slip.
///
/// `None` means "use the standing value": zero for bonus and advances, the
/// employee's record for adjustments, penalties and subsidies, and the
/// effectiveness record for absences.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlipOverrides {
    pub bonus: Option<f64>,
    pub adjustments: Option<f64>,
    pub penalties: Option<f64>,
    pub advances: Option<f64>,
    pub absence_days: Option<i32>,
    pub justified_absence_days: Option<i32>,
    pub subsidies: SubsidyOverrides,
}

/// The six itemised subsidies of a slip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Subsidies {
    pub food: f64,
    pub transport: f64,
    pub housing: f64,
    pub vacation: f64,
    pub christmas: f64,
    pub family: f64,
}

impl Subsidies {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.food + self.transport + self.housing + self.vacation + self.christmas + self.family
    }
}

/// Fully resolved monetary inputs of a slip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryInputs {
    pub base_salary: f64,
    pub complement: f64,
    pub bonus: f64,
    pub adjustments: f64,
    pub penalties: f64,
    pub advances: f64,
    pub absence_days: i32,
    pub justified_absence_days: i32,
    pub subsidies: Subsidies,
}

/// Every line item of a computed slip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryBreakdown {
    pub inputs: SalaryInputs,
    pub absence_deduction: f64,
    pub gross_before_subsidies: f64,
    pub subsidies_total: f64,
    pub gross_total: f64,
    pub social_security: f64,
    pub income_tax: f64,
    pub net_total: f64,
}

/// Computes the slip line items from resolved inputs.
///
/// INSS is taken on the gross before subsidies, while IRT is taken on the
/// full gross including subsidies.
#[must_use]
pub fn calculate(inputs: SalaryInputs) -> SalaryBreakdown {
    let absence_deduction = inputs.base_salary * f64::from(inputs.absence_days) / PRORATION_DAYS;
    let gross_before_subsidies = inputs.base_salary + inputs.complement + inputs.bonus
        - absence_deduction
        + inputs.adjustments
        - inputs.penalties;
    let social_security = social_security_contribution(gross_before_subsidies);
    let subsidies_total = inputs.subsidies.total();
    let gross_total = gross_before_subsidies + subsidies_total;
    let income_tax = progressive_income_tax(gross_total, social_security);
    let net_total = gross_total - social_security - income_tax - inputs.advances;

    SalaryBreakdown {
        inputs,
        absence_deduction,
        gross_before_subsidies,
        subsidies_total,
        gross_total,
        social_security,
        income_tax,
        net_total,
    }
}

fn require_amount(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(value)
}

fn require_delta(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::validation(format!("{field} must be finite, got {value}")));
    }
    Ok(value)
}

/// Most absence days a slip can deduct: the whole pro-ration month.
pub const MAX_ABSENCE_DAYS: i32 = 30;
/// Most justified absences a slip can show: the longest calendar month.
const MAX_JUSTIFIED_DAYS: i32 = 31;

fn require_days(field: &str, value: i32, max: i32) -> Result<i32> {
    if !(0..=max).contains(&value) {
        return Err(Error::validation(format!(
            "{field} must be between 0 and {max}, got {value}"
        )));
    }
    Ok(value)
}

/// Resolves the inputs of a slip from the employee, the period's
/// effectiveness record and the manual overrides.
///
/// # Errors
/// - [`Error::PreconditionViolation`] if the employee is terminated
/// - [`Error::Validation`] if the record belongs to another employee or any
///   amount is negative or not finite
pub fn resolve_inputs(
    employee: &employee::Model,
    record: &effectiveness::Model,
    overrides: &SlipOverrides,
) -> Result<SalaryInputs> {
    let key = PeriodKey::new(record.employee_id, record.month, record.year)?;
    if record.employee_id != employee.id {
        return Err(Error::validation(format!(
            "effectiveness record belongs to employee {}, not {}",
            record.employee_id, employee.id
        )));
    }
    if employee.status.is_terminated() {
        return Err(Error::precondition(key, "employee has been terminated"));
    }

    let manual = &overrides.subsidies;
    let subsidies = Subsidies {
        food: require_amount(
            "subsidy_food",
            manual
                .food
                .or(record.food_subsidy_override)
                .unwrap_or(employee.subsidy_food),
        )?,
        transport: require_amount(
            "subsidy_transport",
            manual
                .transport
                .or(record.transport_subsidy_override)
                .unwrap_or(employee.subsidy_transport),
        )?,
        housing: require_amount(
            "subsidy_housing",
            manual.housing.unwrap_or(employee.subsidy_housing),
        )?,
        vacation: require_amount(
            "subsidy_vacation",
            manual.vacation.unwrap_or(employee.subsidy_vacation),
        )?,
        christmas: require_amount(
            "subsidy_christmas",
            manual.christmas.unwrap_or(employee.subsidy_christmas),
        )?,
        family: require_amount(
            "subsidy_family",
            manual.family.unwrap_or(employee.subsidy_family),
        )?,
    };

    Ok(SalaryInputs {
        base_salary: require_amount("base_salary", employee.base_salary)?,
        complement: require_amount("complement_salary", employee.complement_salary)?,
        bonus: require_amount("bonus", overrides.bonus.unwrap_or(0.0))?,
        adjustments: require_delta(
            "adjustments",
            overrides.adjustments.unwrap_or(employee.salary_adjustments),
        )?,
        penalties: require_delta(
            "penalties",
            overrides.penalties.unwrap_or(employee.penalties),
        )?,
        advances: require_amount("advances", overrides.advances.unwrap_or(0.0))?,
        absence_days: require_days(
            "absence_days",
            overrides.absence_days.unwrap_or_else(|| record.absence_days()),
            MAX_ABSENCE_DAYS,
        )?,
        justified_absence_days: require_days(
            "justified_absence_days",
            overrides
                .justified_absence_days
                .unwrap_or(record.justified_absence_days),
            MAX_JUSTIFIED_DAYS,
        )?,
        subsidies,
    })
}

/// Builds the breakdown of a slip. Requires the period's effectiveness record.
///
/// # Errors
/// Besides the [`resolve_inputs`] errors, [`Error::Validation`] when
/// deductions and penalties push the gross before subsidies below zero.
pub fn compute_salary(
    employee: &employee::Model,
    record: &effectiveness::Model,
    overrides: &SlipOverrides,
) -> Result<SalaryBreakdown> {
    let breakdown = calculate(resolve_inputs(employee, record, overrides)?);
    if breakdown.gross_before_subsidies < 0.0 {
        return Err(Error::validation(format!(
            "Gross salary before subsidies cannot be negative, got {:.2}",
            breakdown.gross_before_subsidies
        )));
    }
    Ok(breakdown)
}

/// Recomputes a stored slip from its line items alone.
#[must_use]
pub fn rederive(slip: &salary_slip::Model) -> SalaryBreakdown {
    calculate(SalaryInputs {
        base_salary: slip.base_salary,
        complement: slip.allowances,
        bonus: slip.bonuses,
        adjustments: slip.adjustments,
        penalties: slip.penalties,
        advances: slip.advances,
        absence_days: slip.absences,
        justified_absence_days: slip.justified_absences,
        subsidies: Subsidies {
            food: slip.subsidy_food,
            transport: slip.subsidy_transport,
            housing: slip.subsidy_housing,
            vacation: slip.subsidy_vacation,
            christmas: slip.subsidy_christmas,
            family: slip.subsidy_family,
        },
    })
}

impl SalaryBreakdown {
    /// Sum withheld from the employee: INSS, IRT and advances.
    #[must_use]
    pub fn discounts(&self) -> f64 {
        self.social_security + self.income_tax + self.inputs.advances
    }

    /// Checks that the totals stored on a slip match its line items.
    #[must_use]
    pub fn matches_slip(&self, slip: &salary_slip::Model) -> bool {
        const TOLERANCE: f64 = 1e-6;
        let close = |a: f64, b: f64| (a - b).abs() <= TOLERANCE;
        close(self.absence_deduction, slip.absence_deduction)
            && close(self.gross_before_subsidies, slip.gross_before_subsidies)
            && close(self.subsidies_total, slip.subsidies)
            && close(self.gross_total, slip.gross_total)
            && close(self.social_security, slip.inss)
            && close(self.income_tax, slip.irt)
            && close(self.net_total, slip.net_total)
    }

    pub(crate) fn to_slip(
        &self,
        employee: &employee::Model,
        key: PeriodKey,
        created_at: DateTime<Utc>,
    ) -> salary_slip::ActiveModel {
        let inputs = &self.inputs;
        salary_slip::ActiveModel {
            id: NotSet,
            employee_id: Set(employee.id),
            employee_name: Set(employee.name.clone()),
            employee_role: Set(employee.role.clone()),
            month: Set(key.month()),
            year: Set(key.year()),
            base_salary: Set(inputs.base_salary),
            allowances: Set(inputs.complement),
            bonuses: Set(inputs.bonus),
            adjustments: Set(inputs.adjustments),
            penalties: Set(inputs.penalties),
            absences: Set(inputs.absence_days),
            justified_absences: Set(inputs.justified_absence_days),
            absence_deduction: Set(self.absence_deduction),
            gross_before_subsidies: Set(self.gross_before_subsidies),
            subsidy_food: Set(inputs.subsidies.food),
            subsidy_transport: Set(inputs.subsidies.transport),
            subsidy_housing: Set(inputs.subsidies.housing),
            subsidy_vacation: Set(inputs.subsidies.vacation),
            subsidy_christmas: Set(inputs.subsidies.christmas),
            subsidy_family: Set(inputs.subsidies.family),
            subsidies: Set(self.subsidies_total),
            gross_total: Set(self.gross_total),
            inss: Set(self.social_security),
            irt: Set(self.income_tax),
            advances: Set(inputs.advances),
            net_total: Set(self.net_total),
            is_processed: Set(true),
            created_at: Set(created_at),
        }
    }
}
