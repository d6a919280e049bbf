// Allocation behavior across the installment ledger: ordering, conservation,
// rejection policies and closure

use chrono::{NaiveDate, NaiveDateTime};
use lendbook::core::AppError;
use lendbook::installments::models::Installment;
use lendbook::loans::models::{LoanAccount, LoanStatus};
use lendbook::loans::services::AmortizationCalculator;
use lendbook::payments::services::PaymentAllocator;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at_noon(d: NaiveDate) -> NaiveDateTime {
    d.and_hms_opt(12, 0, 0).unwrap()
}

/// Active loan with its schedule, first installment due 2025-07-01
fn approved_loan(
    principal: Decimal,
    rate: Decimal,
    tenure: i32,
) -> (LoanAccount, Vec<Installment>) {
    let emi = AmortizationCalculator::quote_emi(principal, rate, tenure).unwrap();
    let schedule =
        AmortizationCalculator::build_schedule(principal, rate, tenure, emi, date(2025, 7, 1))
            .unwrap();

    let mut loan = LoanAccount::new(principal, rate, tenure, emi).unwrap();
    loan.activate(schedule[0].due_date, schedule[0].amount_due);

    let ledger = schedule
        .iter()
        .map(|line| Installment::new(loan.id.clone(), line.due_date, line.amount_due).unwrap())
        .collect();

    (loan, ledger)
}

#[test]
fn test_one_emi_advances_the_schedule() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);
    let emi = loan.emi;

    let outcome =
        PaymentAllocator::allocate(&loan, &ledger, emi, at_noon(date(2025, 7, 1))).unwrap();

    // Interest on 120000 at 1% monthly is 1200.00; the rest retires principal
    assert_eq!(
        outcome.loan.outstanding_balance,
        dec!(120000) - (emi - dec!(1200.00))
    );
    assert_eq!(outcome.completed.len(), 1);
    assert_eq!(outcome.loan.next_due_date, Some(date(2025, 8, 1)));
    assert_eq!(outcome.loan.status, LoanStatus::Active);
    assert_eq!(outcome.loan.last_payment_date, Some(at_noon(date(2025, 7, 1))));
}

#[test]
fn test_zero_and_negative_payments_rejected_without_side_effects() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);

    for amount in [dec!(0), dec!(-1)] {
        let result = PaymentAllocator::allocate(&loan, &ledger, amount, at_noon(date(2025, 7, 1)));
        assert!(matches!(result, Err(AppError::InvalidPaymentAmount(_))));
    }

    // Snapshot inputs are untouched on rejection
    assert_eq!(loan.outstanding_balance, dec!(120000));
    assert!(ledger.iter().all(|i| i.is_pending()));
}

#[test]
fn test_payments_rejected_on_closed_and_pending_loans() {
    let (mut loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);

    for status in [LoanStatus::Pending, LoanStatus::Closed] {
        loan.status = status;
        let result =
            PaymentAllocator::allocate(&loan, &ledger, dec!(100), at_noon(date(2025, 7, 1)));
        assert!(matches!(result, Err(AppError::InvalidPaymentAmount(_))));
    }
}

#[test]
fn test_overpayment_rejected_with_maximum() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);
    let total_due: Decimal = ledger.iter().map(|i| i.amount_due).sum();

    let result = PaymentAllocator::allocate(
        &loan,
        &ledger,
        total_due + dec!(100),
        at_noon(date(2025, 7, 1)),
    );

    match result {
        Err(AppError::OverpaymentAttempt { max_acceptable }) => {
            assert_eq!(max_acceptable, total_due)
        }
        other => panic!("expected OverpaymentAttempt, got {:?}", other),
    }
}

#[test]
fn test_overdue_installments_are_retired_first() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);
    let emi = loan.emi;

    // Three due dates have passed; pay enough for one installment
    let outcome =
        PaymentAllocator::allocate(&loan, &ledger, emi, at_noon(date(2025, 9, 15))).unwrap();

    assert_eq!(outcome.completed.len(), 1);
    assert_eq!(outcome.completed[0].due_date, date(2025, 7, 1));

    // Two past-due installments remain
    assert_eq!(outcome.loan.status, LoanStatus::Overdue);
    assert_eq!(outcome.loan.overdue_months, 2);
    assert_eq!(
        outcome.loan.current_overdue_amount,
        outcome
            .ledger
            .iter()
            .filter(|i| i.is_pending() && i.due_date < date(2025, 9, 15))
            .map(|i| i.amount_due)
            .sum::<Decimal>()
    );
}

#[test]
fn test_partial_payment_keeps_installment_pending_with_amount_unchanged() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);
    let original = ledger[0].amount_due;

    let outcome =
        PaymentAllocator::allocate(&loan, &ledger, dec!(2000), at_noon(date(2025, 7, 1))).unwrap();

    assert!(outcome.completed.is_empty());
    assert!(outcome.ledger[0].is_pending());
    assert_eq!(outcome.ledger[0].amount_due, original);

    // 1200.00 of interest, 800.00 of principal
    assert_eq!(outcome.loan.outstanding_balance, dec!(119200));
}

#[test]
fn test_full_obligation_closes_and_zeroes_the_loan() {
    let (loan, ledger) = approved_loan(dec!(120000), dec!(12), 12);
    let total_due: Decimal = ledger.iter().map(|i| i.amount_due).sum();

    let outcome =
        PaymentAllocator::allocate(&loan, &ledger, total_due, at_noon(date(2025, 7, 1))).unwrap();

    assert_eq!(outcome.loan.status, LoanStatus::Closed);
    assert_eq!(outcome.loan.outstanding_balance, dec!(0));
    assert_eq!(outcome.loan.amount_due, dec!(0));
    assert!(outcome.loan.next_due_date.is_none());
    assert_eq!(outcome.loan.overdue_months, 0);
    assert_eq!(outcome.loan.current_overdue_amount, dec!(0));
    assert!(outcome.ledger.iter().all(|i| !i.is_pending()));
}

#[test]
fn test_balance_is_monotonically_non_increasing_over_the_term() {
    let (mut loan, mut ledger) = approved_loan(dec!(250000), dec!(10.5), 24);
    let mut previous_balance = loan.outstanding_balance;

    while loan.status.is_open_for_payment() {
        let (due_date, amount_due) = ledger
            .iter()
            .find(|i| i.is_pending())
            .map(|i| (i.due_date, i.amount_due))
            .unwrap();

        let outcome =
            PaymentAllocator::allocate(&loan, &ledger, amount_due, at_noon(due_date)).unwrap();
        loan = outcome.loan;
        ledger = outcome.ledger;

        assert!(loan.outstanding_balance <= previous_balance);
        assert!(loan.outstanding_balance >= Decimal::ZERO);
        previous_balance = loan.outstanding_balance;
    }

    assert_eq!(loan.status, LoanStatus::Closed);
    assert_eq!(loan.outstanding_balance, dec!(0));
}

proptest! {
    /// Whatever the payment size, the balance never increases, never drops
    /// below zero, and completed installments are exactly the fully covered
    /// prefix of the pending ledger
    #[test]
    fn prop_allocation_conserves_money(
        principal_cents in 1_000_000i64..50_000_000i64,
        rate_bp in 0i64..2_400i64,
        tenure in 3i32..36i32,
        payment_ratio in 1u32..100u32,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bp, 2);
        let (loan, ledger) = approved_loan(principal, rate, tenure);

        let total_due: Decimal = ledger.iter().map(|i| i.amount_due).sum();
        let paid = (total_due * Decimal::from(payment_ratio) / Decimal::from(100))
            .round_dp(2)
            .max(Decimal::new(1, 2));

        let outcome =
            PaymentAllocator::allocate(&loan, &ledger, paid, at_noon(date(2025, 7, 1))).unwrap();

        prop_assert!(outcome.loan.outstanding_balance <= loan.outstanding_balance);
        prop_assert!(outcome.loan.outstanding_balance >= Decimal::ZERO);

        // Completed rows form a prefix in due-date order
        let completed_count = outcome.completed.len();
        for (index, installment) in outcome.ledger.iter().enumerate() {
            if index < completed_count {
                prop_assert!(!installment.is_pending());
            }
        }

        // Fully covered installments never exceed the payment
        let covered: Decimal = outcome.completed.iter().map(|i| i.amount_due).sum();
        prop_assert!(covered <= paid + Decimal::new(1, 2));
    }

    /// Rejections never mutate anything and identify the acceptable maximum
    #[test]
    fn prop_overpayment_reports_exact_maximum(
        principal_cents in 1_000_000i64..50_000_000i64,
        rate_bp in 0i64..2_400i64,
        tenure in 3i32..36i32,
        excess_cents in 1i64..1_000_000i64,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bp, 2);
        let (loan, ledger) = approved_loan(principal, rate, tenure);

        let total_due: Decimal = ledger.iter().map(|i| i.amount_due).sum();
        let paid = total_due + Decimal::new(excess_cents, 2);

        let result =
            PaymentAllocator::allocate(&loan, &ledger, paid, at_noon(date(2025, 7, 1)));

        match result {
            Err(AppError::OverpaymentAttempt { max_acceptable }) => {
                prop_assert_eq!(max_acceptable, total_due);
            }
            other => prop_assert!(false, "expected OverpaymentAttempt, got {:?}", other),
        }
    }
}
