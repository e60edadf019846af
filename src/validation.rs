// Validation utilities module
// Custom validator functions for rate plan, override and inventory payloads

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a money amount is zero or positive
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        Err(ValidationError::new("amount_must_not_be_negative"))
    } else {
        Ok(())
    }
}

/// Validates an ISO 4217 style currency code: exactly three uppercase letters
pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_currency_code"))
    }
}

/// Validates that no channel code is blank
pub fn validate_channel_codes(codes: &[String]) -> Result<(), ValidationError> {
    if codes.iter().any(|code| code.trim().is_empty()) {
        Err(ValidationError::new("blank_channel_code"))
    } else {
        Ok(())
    }
}

/// Reports `min > max` for optional bounds as a message, or None when consistent
pub fn check_bounds<T: PartialOrd + std::fmt::Display>(
    label: &str,
    min: Option<T>,
    max: Option<T>,
) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Some(format!(
            "{} minimum ({}) cannot exceed maximum ({})",
            label, min, max
        )),
        _ => None,
    }
}
