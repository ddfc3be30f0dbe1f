use bigdecimal::BigDecimal;
use std::fmt;

pub const RECHARGE_MIN_AMOUNT: i64 = 50;
pub const RECHARGE_MAX_AMOUNT: i64 = 10_000;
pub const MERCHANT_NAME_MAX_LEN: usize = 120;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const PAYMENT_METHOD_MAX_LEN: usize = 20;

pub const TRANSACTION_TYPES: &[&str] =
    &["recharge", "payment", "refund", "transfer_in", "transfer_out"];
pub const TRANSACTION_STATUSES: &[&str] = &["pending", "completed", "failed", "cancelled"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::from(0) {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

/// Recharges must stay within the fixed top-up bracket.
pub fn validate_recharge_amount(amount: &BigDecimal) -> ValidationResult {
    if amount < &BigDecimal::from(RECHARGE_MIN_AMOUNT)
        || amount > &BigDecimal::from(RECHARGE_MAX_AMOUNT)
    {
        return Err(ValidationError::new(
            "amount",
            format!(
                "must be between {} and {}",
                RECHARGE_MIN_AMOUNT, RECHARGE_MAX_AMOUNT
            ),
        ));
    }

    Ok(())
}

pub fn validate_payment_method(payment_method: &str) -> ValidationResult {
    let payment_method = sanitize_string(payment_method);
    validate_required("payment_method", &payment_method)?;
    validate_max_len("payment_method", &payment_method, PAYMENT_METHOD_MAX_LEN)?;

    Ok(())
}

/// Transaction list filter: `all` (or absent) means no filter, anything else
/// must be a known transaction type.
pub fn validate_type_filter(type_filter: &str) -> ValidationResult {
    if type_filter == "all" {
        return Ok(());
    }

    validate_enum("type", type_filter, TRANSACTION_TYPES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("status", "pending", &["pending", "completed"]).is_ok());
        assert!(validate_enum("status", "unknown", &["pending", "completed"]).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount(&positive).is_ok());
        assert!(validate_positive_amount(&zero).is_err());
        assert!(validate_positive_amount(&negative).is_err());
    }

    #[test]
    fn validates_recharge_bounds() {
        assert!(validate_recharge_amount(&BigDecimal::from(50)).is_ok());
        assert!(validate_recharge_amount(&BigDecimal::from(10_000)).is_ok());
        assert!(validate_recharge_amount(&BigDecimal::from(500)).is_ok());

        assert!(validate_recharge_amount(&BigDecimal::from(49)).is_err());
        assert!(validate_recharge_amount(&BigDecimal::from(10_001)).is_err());
        assert!(validate_recharge_amount(&BigDecimal::from(0)).is_err());
        assert!(validate_recharge_amount(&BigDecimal::from(-50)).is_err());
    }

    #[test]
    fn recharge_bounds_are_inclusive_with_decimals() {
        assert!(validate_recharge_amount(&BigDecimal::from_str("50.00").unwrap()).is_ok());
        assert!(validate_recharge_amount(&BigDecimal::from_str("49.99").unwrap()).is_err());
        assert!(validate_recharge_amount(&BigDecimal::from_str("10000.01").unwrap()).is_err());
    }

    #[test]
    fn validates_payment_method() {
        assert!(validate_payment_method("upi").is_ok());
        assert!(validate_payment_method("  card  ").is_ok());
        assert!(validate_payment_method("").is_err());
        assert!(validate_payment_method(&"x".repeat(21)).is_err());
    }

    #[test]
    fn validates_type_filter() {
        assert!(validate_type_filter("all").is_ok());
        assert!(validate_type_filter("recharge").is_ok());
        assert!(validate_type_filter("payment").is_ok());
        assert!(validate_type_filter("transfer_in").is_ok());
        assert!(validate_type_filter("bogus").is_err());
    }
}
