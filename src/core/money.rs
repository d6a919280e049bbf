use rust_decimal::Decimal;

/// Currency precision rules for loan amounts
///
/// All monetary values are INR with 2 decimal places. Balances at or below
/// [`closure_epsilon`] are treated as cleared so repeated rounding cannot
/// leave a loan open over a residual cent.
pub const SCALE: u32 = 2;

/// Rounds an amount to currency precision (banker's rounding)
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp(SCALE)
}

/// Largest balance considered fully repaid
pub fn closure_epsilon() -> Decimal {
    Decimal::new(1, SCALE)
}

/// True when a balance is within the closure threshold
pub fn is_cleared(balance: Decimal) -> bool {
    balance <= closure_epsilon()
}

/// Validates that an amount is non-negative and within currency precision
pub fn validate_amount(amount: Decimal) -> Result<(), String> {
    if amount < Decimal::ZERO {
        return Err("amount cannot be negative".to_string());
    }

    if amount.scale() > SCALE {
        return Err(format!(
            "amounts must have at most {} decimal places, got {}",
            SCALE,
            amount.scale()
        ));
    }

    Ok(())
}
