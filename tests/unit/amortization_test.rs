// Property-based tests for EMI quoting and schedule generation

use chrono::NaiveDate;
use lendbook::loans::services::AmortizationCalculator;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn first_due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

#[test]
fn test_canonical_terms_quote() {
    // 120000 at 12% over 12 months: monthly rate 0.01, annuity EMI
    let emi = AmortizationCalculator::quote_emi(dec!(120000), dec!(12), 12).unwrap();
    assert!((emi - dec!(10661.85)).abs() <= dec!(0.01), "emi = {}", emi);

    // EMI times tenure covers principal plus interest
    assert!(emi * Decimal::from(12) > dec!(120000));
}

#[test]
fn test_zero_rate_quote_is_flat_division() {
    let emi = AmortizationCalculator::quote_emi(dec!(120000), dec!(0), 12).unwrap();
    assert_eq!(emi, dec!(10000));
}

#[test]
fn test_invalid_inputs_rejected() {
    assert!(AmortizationCalculator::quote_emi(dec!(0), dec!(12), 12).is_err());
    assert!(AmortizationCalculator::quote_emi(dec!(-100), dec!(12), 12).is_err());
    assert!(AmortizationCalculator::quote_emi(dec!(100), dec!(-1), 12).is_err());
    assert!(AmortizationCalculator::quote_emi(dec!(100), dec!(12), 0).is_err());
}

#[test]
fn test_schedule_zeroes_the_balance_exactly() {
    let principal = dec!(120000);
    let emi = AmortizationCalculator::quote_emi(principal, dec!(12), 12).unwrap();
    let lines =
        AmortizationCalculator::build_schedule(principal, dec!(12), 12, emi, first_due()).unwrap();

    let total_principal: Decimal = lines.iter().map(|l| l.principal_portion).sum();
    assert_eq!(total_principal, principal);

    // Amounts equal the sum of their portions
    for line in &lines {
        assert_eq!(
            line.amount_due,
            line.principal_portion + line.interest_portion
        );
    }
}

#[test]
fn test_zero_rate_schedule_is_interest_free() {
    let lines =
        AmortizationCalculator::build_schedule(dec!(120000), dec!(0), 12, dec!(10000), first_due())
            .unwrap();

    assert_eq!(lines.len(), 12);
    assert!(lines.iter().all(|l| l.interest_portion == Decimal::ZERO));

    let total: Decimal = lines.iter().map(|l| l.amount_due).sum();
    assert_eq!(total, dec!(120000));
}

#[test]
fn test_schedule_due_dates_are_unique_and_monthly() {
    let emi = AmortizationCalculator::quote_emi(dec!(60000), dec!(9.5), 24).unwrap();
    let lines =
        AmortizationCalculator::build_schedule(dec!(60000), dec!(9.5), 24, emi, first_due())
            .unwrap();

    let mut seen = std::collections::HashSet::new();
    for line in &lines {
        assert!(seen.insert(line.due_date), "duplicate due date {}", line.due_date);
    }

    for window in lines.windows(2) {
        assert!(window[0].due_date < window[1].due_date);
    }
}

proptest! {
    /// Principal portions always sum to the principal exactly: no residual
    /// cents survive schedule generation
    #[test]
    fn prop_principal_is_conserved(
        principal_cents in 10_000i64..1_000_000_000i64,
        rate_bp in 0i64..3_600i64,
        tenure in 1i32..120i32,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bp, 2);

        let emi = AmortizationCalculator::quote_emi(principal, rate, tenure).unwrap();
        let lines =
            AmortizationCalculator::build_schedule(principal, rate, tenure, emi, first_due())
                .unwrap();

        prop_assert_eq!(lines.len(), tenure as usize);

        let total_principal: Decimal = lines.iter().map(|l| l.principal_portion).sum();
        prop_assert_eq!(total_principal, principal);
    }

    /// Every schedule line stays internally consistent
    #[test]
    fn prop_lines_are_consistent(
        principal_cents in 10_000i64..100_000_000i64,
        rate_bp in 0i64..2_400i64,
        tenure in 1i32..60i32,
    ) {
        let principal = Decimal::new(principal_cents, 2);
        let rate = Decimal::new(rate_bp, 2);

        let emi = AmortizationCalculator::quote_emi(principal, rate, tenure).unwrap();
        let lines =
            AmortizationCalculator::build_schedule(principal, rate, tenure, emi, first_due())
                .unwrap();

        for line in &lines {
            prop_assert!(line.principal_portion >= Decimal::ZERO);
            prop_assert!(line.interest_portion >= Decimal::ZERO);
            prop_assert_eq!(
                line.amount_due,
                line.principal_portion + line.interest_portion
            );
        }
    }

    /// Zero-rate schedules carry no interest at any tenure
    #[test]
    fn prop_zero_rate_has_no_interest(
        principal_cents in 10_000i64..100_000_000i64,
        tenure in 1i32..60i32,
    ) {
        let principal = Decimal::new(principal_cents, 2);

        let emi = AmortizationCalculator::quote_emi(principal, Decimal::ZERO, tenure).unwrap();
        let lines = AmortizationCalculator::build_schedule(
            principal,
            Decimal::ZERO,
            tenure,
            emi,
            first_due(),
        )
        .unwrap();

        for line in &lines {
            prop_assert_eq!(line.interest_portion, Decimal::ZERO);
        }

        let total: Decimal = lines.iter().map(|l| l.amount_due).sum();
        prop_assert_eq!(total, principal);
    }
}
