// Overdue derivation and its idempotence across repeated passes

use chrono::NaiveDate;
use lendbook::installments::models::Installment;
use lendbook::installments::services::OverdueTracker;
use lendbook::loans::models::{LoanAccount, LoanStatus};
use lendbook::loans::services::StatusEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn installment(loan_id: &str, due: NaiveDate, amount: Decimal) -> Installment {
    Installment::new(loan_id.to_string(), due, amount).unwrap()
}

fn active_loan() -> LoanAccount {
    let mut loan = LoanAccount::new(dec!(50000), dec!(12), 5, dec!(10301.00)).unwrap();
    loan.activate(date(2025, 3, 10), dec!(10301.00));
    loan
}

#[test]
fn test_past_due_pending_classifies_overdue() {
    let mut loan = active_loan();
    let ledger = vec![
        installment(&loan.id, date(2025, 3, 10), dec!(10301.00)),
        installment(&loan.id, date(2025, 4, 10), dec!(10301.00)),
        installment(&loan.id, date(2025, 5, 10), dec!(10301.00)),
    ];

    let summary = OverdueTracker::assess(&ledger, date(2025, 5, 1));
    assert_eq!(summary.overdue_months, 2);
    assert_eq!(summary.overdue_amount, dec!(20602.00));

    StatusEngine::recompute(&mut loan, &ledger, date(2025, 5, 1));
    assert_eq!(loan.status, LoanStatus::Overdue);
    assert_eq!(loan.overdue_months, 2);
    assert_eq!(loan.current_overdue_amount, dec!(20602.00));
    // May's installment has arrived, so it is payable on top of the arrears
    assert_eq!(loan.amount_due, dec!(30903.00));
}

#[test]
fn test_repeated_passes_are_idempotent() {
    let mut loan = active_loan();
    let ledger = vec![
        installment(&loan.id, date(2025, 3, 10), dec!(10301.00)),
        installment(&loan.id, date(2025, 4, 10), dec!(10301.00)),
    ];

    StatusEngine::recompute(&mut loan, &ledger, date(2025, 5, 1));
    let first_pass = (
        loan.status,
        loan.overdue_months,
        loan.current_overdue_amount,
        loan.amount_due,
        loan.next_due_date,
    );

    // Re-running the derivation over an unchanged ledger changes nothing
    for _ in 0..3 {
        StatusEngine::recompute(&mut loan, &ledger, date(2025, 5, 1));
        let pass = (
            loan.status,
            loan.overdue_months,
            loan.current_overdue_amount,
            loan.amount_due,
            loan.next_due_date,
        );
        assert_eq!(pass, first_pass);
    }
}

#[test]
fn test_completed_rows_do_not_count() {
    let loan = active_loan();
    let mut cleared = installment(&loan.id, date(2025, 3, 10), dec!(10301.00));
    cleared
        .complete(date(2025, 3, 10).and_hms_opt(9, 0, 0).unwrap())
        .unwrap();

    let ledger = vec![cleared, installment(&loan.id, date(2025, 4, 10), dec!(10301.00))];

    let summary = OverdueTracker::assess(&ledger, date(2025, 5, 1));
    assert_eq!(summary.overdue_months, 1);
    assert_eq!(summary.overdue_amount, dec!(10301.00));
}

#[test]
fn test_curing_arrears_reverts_to_active() {
    let mut loan = active_loan();
    let mut first = installment(&loan.id, date(2025, 3, 10), dec!(10301.00));
    let second = installment(&loan.id, date(2025, 6, 10), dec!(10301.00));

    StatusEngine::recompute(&mut loan, &[first.clone(), second.clone()], date(2025, 5, 1));
    assert_eq!(loan.status, LoanStatus::Overdue);

    first
        .complete(date(2025, 5, 2).and_hms_opt(9, 0, 0).unwrap())
        .unwrap();

    StatusEngine::recompute(&mut loan, &[first, second], date(2025, 5, 3));
    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.overdue_months, 0);
    assert_eq!(loan.current_overdue_amount, dec!(0));
    assert_eq!(loan.next_due_date, Some(date(2025, 6, 10)));
}

#[test]
fn test_evaluation_date_controls_classification() {
    let loan = active_loan();
    let ledger = vec![installment(&loan.id, date(2025, 3, 10), dec!(10301.00))];

    // Not overdue on or before the due date
    assert_eq!(OverdueTracker::assess(&ledger, date(2025, 3, 10)).overdue_months, 0);
    assert_eq!(OverdueTracker::assess(&ledger, date(2025, 3, 9)).overdue_months, 0);

    // Overdue the day after
    let summary = OverdueTracker::assess(&ledger, date(2025, 3, 11));
    assert_eq!(summary.overdue_months, 1);
    assert_eq!(summary.overdue_amount, dec!(10301.00));
}
