//! Transfer orders - Paying a batch of processed salaries.
//!
//! A transfer is all-or-nothing. Every selected employee is checked first:
//! each must exist and be in `SalaryProcessed` for the period. If any member
//! fails, the batch is rejected with [`Error::BatchRejected`] and nothing is
//! written. Only then are the order, its items and one ledger posting per
//! employee written, together with the register debit, in one transaction.

use crate::{
    config::PayrollConfig,
    core::{
        ledger::{NewPosting, get_cash_register, post_outflow},
        period::{Period, PeriodState, find_salary_slip, period_state},
    },
    entities::{
        Employee, TransferOrder, TransferOrderItem, employee, ledger_posting, salary_slip,
        transfer_order, transfer_order_item,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// An operator's request to pay a selection of employees for a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub period: Period,
    pub employee_ids: Vec<i64>,
    /// Register the money leaves from
    pub cash_register_id: i64,
    /// Issue date of the order and its postings
    pub issued_on: NaiveDate,
}

impl TransferRequest {
    #[must_use]
    pub const fn new(
        period: Period,
        employee_ids: Vec<i64>,
        cash_register_id: i64,
        issued_on: NaiveDate,
    ) -> Self {
        Self {
            period,
            employee_ids,
            cash_register_id,
            issued_on,
        }
    }
}

/// Everything a committed transfer wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub order: transfer_order::Model,
    pub items: Vec<transfer_order_item::Model>,
    pub postings: Vec<ledger_posting::Model>,
}

/// Printed order reference: `{prefix}/{ddmmyyyy}`.
#[must_use]
pub fn transfer_reference(prefix: &str, issued_on: NaiveDate) -> String {
    format!("{prefix}/{}", issued_on.format("%d%m%Y"))
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// Creates a transfer order for the whole selection, or nothing at all.
///
/// # Errors
/// - [`Error::Validation`] for an empty selection
/// - [`Error::CashRegisterNotFound`] / [`Error::EmployeeNotFound`]
/// - [`Error::BatchRejected`] if any member lacks a processed salary or was
///   already paid for the period
/// - [`Error::Database`] if the storage layer fails; the transaction is rolled back
#[instrument(skip(db, config, request), fields(period = %request.period.label(), selected = request.employee_ids.len()))]
pub async fn create_transfer_order(
    db: &DatabaseConnection,
    config: &PayrollConfig,
    request: &TransferRequest,
) -> Result<TransferReceipt> {
    let selection: BTreeSet<i64> = request.employee_ids.iter().copied().collect();
    if selection.is_empty() {
        return Err(Error::validation("Select at least one employee to transfer"));
    }

    let period = request.period;
    let txn = db.begin().await?;

    let register = get_cash_register(&txn, request.cash_register_id)
        .await?
        .ok_or(Error::CashRegisterNotFound {
            id: request.cash_register_id,
        })?;

    // Validate the whole batch before any write
    let mut payable: Vec<(employee::Model, salary_slip::Model)> = Vec::new();
    let mut unprocessed = Vec::new();
    let mut already_paid = Vec::new();
    for &employee_id in &selection {
        let employee = Employee::find_by_id(employee_id)
            .one(&txn)
            .await?
            .ok_or(Error::EmployeeNotFound { id: employee_id })?;
        let key = period.key(employee_id);
        match period_state(&txn, key).await? {
            PeriodState::SalaryProcessed => {
                let slip = find_salary_slip(&txn, key)
                    .await?
                    .ok_or_else(|| Error::precondition(key, "salary slip disappeared"))?;
                payable.push((employee, slip));
            }
            PeriodState::Paid => already_paid.push(employee_id),
            PeriodState::Open | PeriodState::EffectivenessProcessed => {
                unprocessed.push(employee_id);
            }
        }
    }

    if !unprocessed.is_empty() || !already_paid.is_empty() {
        warn!(?unprocessed, ?already_paid, "transfer batch rejected");
        return Err(Error::BatchRejected {
            month: period.month(),
            year: period.year(),
            unprocessed,
            already_paid,
        });
    }

    let total_amount: f64 = payable.iter().map(|(_, slip)| slip.net_total).sum();
    let order = transfer_order::ActiveModel {
        reference: Set(transfer_reference(
            &config.transfer.reference_prefix,
            request.issued_on,
        )),
        date: Set(request.issued_on),
        total_amount: Set(total_amount),
        total_count: Set(i32::try_from(payable.len())
            .map_err(|_| Error::validation("Too many employees in one transfer"))?),
        cash_register_id: Set(register.id),
        cash_register_name: Set(register.name.clone()),
        company_id: Set(config.company.id.clone()),
        month: Set(period.month()),
        year: Set(period.year()),
        period: Set(period.label()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(payable.len());
    let mut postings = Vec::with_capacity(payable.len());
    for (employee, slip) in &payable {
        let item = transfer_order_item::ActiveModel {
            transfer_order_id: Set(order.id),
            employee_id: Set(employee.id),
            salary_slip_id: Set(slip.id),
            month: Set(period.month()),
            year: Set(period.year()),
            employee_name: Set(employee.name.clone()),
            bank_name: Set(or_placeholder(
                employee.bank_name.as_deref(),
                &config.transfer.default_bank_name,
            )),
            account_number: Set(or_placeholder(employee.bank_account.as_deref(), "---")),
            iban: Set(or_placeholder(employee.iban.as_deref(), "---")),
            gross_amount: Set(slip.gross_total),
            discounts: Set(slip.inss + slip.irt + slip.advances),
            amount: Set(slip.net_total),
            description: Set(format!(
                "Transferência Salário de {} de {} de {}",
                period.month_name(),
                period.year(),
                employee.name
            )),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);

        let posting = post_outflow(
            &txn,
            config,
            NewPosting {
                cash_register_id: register.id,
                transfer_order_id: order.id,
                employee_id: employee.id,
                posted_on: request.issued_on,
                amount: slip.net_total,
                description: format!("Pagamento Salário {} - {}", employee.name, period.label()),
                reference: format!(
                    "TRANSF-{}",
                    or_placeholder(employee.idnf.as_deref(), "EMP")
                ),
            },
        )
        .await?;
        postings.push(posting);
    }

    txn.commit().await?;

    info!(
        order_id = order.id,
        reference = %order.reference,
        total_amount,
        count = items.len(),
        "transfer order committed"
    );
    Ok(TransferReceipt {
        order,
        items,
        postings,
    })
}

/// Transfer orders issued for a period, oldest first.
pub async fn transfer_orders_for_period<C: ConnectionTrait>(
    db: &C,
    period: Period,
) -> Result<Vec<transfer_order::Model>> {
    TransferOrder::find()
        .filter(transfer_order::Column::Month.eq(period.month()))
        .filter(transfer_order::Column::Year.eq(period.year()))
        .order_by_asc(transfer_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Items of a transfer order, in insertion order.
pub async fn transfer_order_items<C: ConnectionTrait>(
    db: &C,
    transfer_order_id: i64,
) -> Result<Vec<transfer_order_item::Model>> {
    TransferOrderItem::find()
        .filter(transfer_order_item::Column::TransferOrderId.eq(transfer_order_id))
        .order_by_asc(transfer_order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            ledger::postings_for_register,
            period::{SkipReason, mass_process_effectiveness, mass_process_salary},
        },
        entities::{LedgerPosting, TransferOrder},
        test_utils::*,
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    async fn processed_employees(
        db: &DatabaseConnection,
        names: &[(&str, f64)],
    ) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        for (name, base) in names {
            ids.push(create_test_employee(db, name, *base).await?.id);
        }
        mass_process_effectiveness(db, test_period(), &ids).await?;
        mass_process_salary(db, test_period(), &ids).await?;
        Ok(ids)
    }

    #[test]
    fn test_transfer_reference_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 28).unwrap();
        assert_eq!(transfer_reference("1250.1", date), "1250.1/28032025");
    }

    #[tokio::test]
    async fn test_empty_selection_rejected_before_any_query() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let request = TransferRequest::new(test_period(), Vec::new(), 1, test_date());

        let result = create_transfer_order(&db, &test_config(), &request).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_batch_commit() -> Result<()> {
        let db = setup_test_db().await?;
        let ids = processed_employees(&db, &[("Ana Lopes", 100_000.0), ("Bruno Neto", 600_000.0)])
            .await?;
        let register = create_test_cash_register(&db, 2_000_000.0).await?;

        let receipt = create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), ids.clone(), register.id, test_date()),
        )
        .await?;

        let expected_total = 92_300.0 + (600_000.0 - 18_000.0 - 95_500.0);
        assert_close(receipt.order.total_amount, expected_total);
        assert_eq!(receipt.order.total_count, 2);
        assert_eq!(receipt.order.period, "Março/2025");
        assert_eq!(receipt.order.reference, "1250.1/31032025");
        assert_eq!(receipt.order.company_id, test_config().company.id);
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.postings.len(), 2);

        let first = &receipt.items[0];
        assert_eq!(first.employee_id, ids[0]);
        assert_close(first.amount, 92_300.0);
        assert_close(first.gross_amount, 100_000.0);
        assert_close(first.discounts, 7_700.0);
        assert_eq!(first.bank_name, "Pagamento em Mão");
        assert_eq!(first.iban, "---");
        assert_eq!(
            first.description,
            "Transferência Salário de Março de 2025 de Ana Lopes"
        );

        let posting = &receipt.postings[0];
        assert_eq!(posting.description, "Pagamento Salário Ana Lopes - Março/2025");
        assert_eq!(posting.reference, "TRANSF-EMP");
        assert_eq!(posting.origin, "RH");
        assert_close(posting.amount, 92_300.0);

        // Every item equals the net of the slip it references
        for item in &receipt.items {
            let slip = find_salary_slip(&db, test_period().key(item.employee_id))
                .await?
                .unwrap();
            assert_eq!(item.salary_slip_id, slip.id);
            assert_close(item.amount, slip.net_total);
        }

        let register = get_cash_register(&db, register.id).await?.unwrap();
        assert_close(register.balance, 2_000_000.0 - expected_total);

        let orders = transfer_orders_for_period(&db, test_period()).await?;
        assert_eq!(orders.len(), 1);
        assert_eq!(transfer_order_items(&db, orders[0].id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_batch_with_unprocessed_member_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let mut ids =
            processed_employees(&db, &[("Carla Dias", 100_000.0), ("Daniel Sousa", 150_000.0)])
                .await?;
        let lagging = create_test_employee(&db, "Eva Costa", 120_000.0).await?;
        record_test_effectiveness(&db, test_period().key(lagging.id)).await?;
        ids.push(lagging.id);
        let register = create_test_cash_register(&db, 1_000_000.0).await?;

        let result = create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), ids.clone(), register.id, test_date()),
        )
        .await;

        match result {
            Err(Error::BatchRejected {
                unprocessed,
                already_paid,
                month,
                year,
            }) => {
                assert_eq!(unprocessed, vec![lagging.id]);
                assert!(already_paid.is_empty());
                assert_eq!((month, year), (3, 2025));
            }
            other => panic!("expected batch rejection, got {other:?}"),
        }

        assert_eq!(TransferOrder::find().count(&db).await?, 0);
        assert_eq!(TransferOrderItem::find().count(&db).await?, 0);
        assert_eq!(LedgerPosting::find().count(&db).await?, 0);
        assert!(postings_for_register(&db, register.id).await?.is_empty());
        let register = get_cash_register(&db, register.id).await?.unwrap();
        assert_close(register.balance, 1_000_000.0);
        for id in &ids[..2] {
            assert_eq!(
                period_state(&db, test_period().key(*id)).await?,
                PeriodState::SalaryProcessed
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_employee_cannot_be_paid_twice_for_a_period() -> Result<()> {
        let db = setup_test_db().await?;
        let ids = processed_employees(&db, &[("Filipe Ramos", 100_000.0)]).await?;
        let register = create_test_cash_register(&db, 1_000_000.0).await?;
        let request = TransferRequest::new(test_period(), ids.clone(), register.id, test_date());

        create_transfer_order(&db, &test_config(), &request).await?;
        let second = create_transfer_order(&db, &test_config(), &request).await;

        assert!(matches!(
            second,
            Err(Error::BatchRejected { ref already_paid, .. }) if *already_paid == ids
        ));
        assert_eq!(TransferOrder::find().count(&db).await?, 1);

        // A paid period is terminal for bulk salary processing too
        let outcome = mass_process_salary(&db, test_period(), &ids).await?;
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::NotApplicable(PeriodState::Paid)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_register_or_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let ids = processed_employees(&db, &[("Gabriela Nunes", 100_000.0)]).await?;

        let result = create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), ids, 42, test_date()),
        )
        .await;
        assert!(matches!(result, Err(Error::CashRegisterNotFound { id: 42 })));

        let register = create_test_cash_register(&db, 0.0).await?;
        let result = create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), vec![777], register.id, test_date()),
        )
        .await;
        assert!(matches!(result, Err(Error::EmployeeNotFound { id: 777 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_banking_details_copied_to_items() -> Result<()> {
        let db = setup_test_db().await?;
        let employee = create_banked_employee(&db, "Helena Matos", "BAI", "0012345", "AO0600400000").await?;
        let key = test_period().key(employee.id);
        record_test_effectiveness(&db, key).await?;
        crate::core::period::process_salary(&db, key, &Default::default()).await?;
        let register = create_test_cash_register(&db, 1_000_000.0).await?;

        let receipt = create_transfer_order(
            &db,
            &test_config(),
            &TransferRequest::new(test_period(), vec![employee.id], register.id, test_date()),
        )
        .await?;

        let item = &receipt.items[0];
        assert_eq!(item.bank_name, "BAI");
        assert_eq!(item.account_number, "0012345");
        assert_eq!(item.iban, "AO0600400000");
        assert_eq!(receipt.postings[0].reference, "TRANSF-H-001");

        Ok(())
    }
}
