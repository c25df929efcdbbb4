//! Period payroll summary - Headcount and totals for one month.

use crate::{
    core::{
        deductions::{employer_social_security_contribution, social_security_contribution},
        period::Period,
    },
    entities::{Employee, SalarySlip, TransferOrder, employee, salary_slip, transfer_order},
    errors::Result,
};
use sea_orm::prelude::*;
use tracing::debug;

/// Aggregate figures shown on the payroll dashboard for a period.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollSummary {
    pub period: Period,
    pub total_employees: u64,
    /// Active or readmitted
    pub active_employees: u64,
    pub terminated_employees: u64,
    /// Sum of base salaries of active employees
    pub total_base_salary: f64,
    /// Employee INSS (3%) on `total_base_salary`
    pub employee_social_security: f64,
    /// Employer INSS (8%) on `total_base_salary`
    pub employer_social_security: f64,
    /// Salary slips processed for the period
    pub processed_slips: u64,
    /// Sum of transfer orders issued for the period
    pub total_paid: f64,
    /// Active employees still without a slip, never negative
    pub pending: u64,
}

/// Computes the payroll summary for a period.
pub async fn payroll_summary<C: ConnectionTrait>(db: &C, period: Period) -> Result<PayrollSummary> {
    let employees = Employee::find().all(db).await?;
    let active: Vec<&employee::Model> = employees.iter().filter(|e| e.status.is_active()).collect();
    let terminated = employees
        .iter()
        .filter(|e| e.status.is_terminated())
        .count();
    let total_base_salary: f64 = active.iter().map(|e| e.base_salary).sum();

    let processed_slips = SalarySlip::find()
        .filter(salary_slip::Column::Month.eq(period.month()))
        .filter(salary_slip::Column::Year.eq(period.year()))
        .count(db)
        .await?;

    let total_paid: f64 = TransferOrder::find()
        .filter(transfer_order::Column::Month.eq(period.month()))
        .filter(transfer_order::Column::Year.eq(period.year()))
        .all(db)
        .await?
        .iter()
        .map(|order| order.total_amount)
        .sum();

    let active_employees = active.len() as u64;
    let summary = PayrollSummary {
        period,
        total_employees: employees.len() as u64,
        active_employees,
        terminated_employees: terminated as u64,
        total_base_salary,
        employee_social_security: social_security_contribution(total_base_salary),
        employer_social_security: employer_social_security_contribution(total_base_salary),
        processed_slips,
        total_paid,
        pending: active_employees.saturating_sub(processed_slips),
    };
    debug!(?summary, "payroll summary computed");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            period::{mass_process_effectiveness, mass_process_salary},
            transfer::{TransferRequest, create_transfer_order},
        },
        entities::EmploymentStatus,
        test_utils::*,
    };

    #[tokio::test]
    async fn test_empty_summary() -> Result<()> {
        let db = setup_test_db().await?;
        let summary = payroll_summary(&db, test_period()).await?;

        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.pending, 0);
        assert_close(summary.total_paid, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_summary_counts_and_totals() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_employee(&db, "Ana Lopes", 100_000.0).await?;
        let bruno = create_test_employee(&db, "Bruno Neto", 200_000.0).await?;
        let carla = create_test_employee(&db, "Carla Dias", 50_000.0).await?;
        dismiss_test_employee(&db, carla.id).await?;
        let daniel = create_test_employee(&db, "Daniel Sousa", 70_000.0).await?;
        set_test_status(&db, daniel.id, EmploymentStatus::OnLeave).await?;

        mass_process_effectiveness(&db, test_period(), &[ana.id, bruno.id]).await?;
        mass_process_salary(&db, test_period(), &[ana.id]).await?;
        let register = create_test_cash_register(&db, 1_000_000.0).await?;
        create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), vec![ana.id], register.id, test_date()),
        )
        .await?;

        let summary = payroll_summary(&db, test_period()).await?;
        assert_eq!(summary.total_employees, 4);
        assert_eq!(summary.active_employees, 2);
        assert_eq!(summary.terminated_employees, 1);
        assert_close(summary.total_base_salary, 300_000.0);
        assert_close(summary.employee_social_security, 9_000.0);
        assert_close(summary.employer_social_security, 24_000.0);
        assert_eq!(summary.processed_slips, 1);
        assert_close(summary.total_paid, 92_300.0);
        assert_eq!(summary.pending, 1);

        // Other periods are unaffected
        let april = payroll_summary(&db, Period::new(4, 2025)?).await?;
        assert_eq!(april.processed_slips, 0);
        assert_eq!(april.pending, 2);
        assert_close(april.total_paid, 0.0);

        Ok(())
    }
}
