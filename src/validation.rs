//! Input validation for the claim and validator forms
//!
//! These checks block a submission before it reaches the network; the
//! message is shown inline next to the field.

use crate::models::redemption::CustomerDetails;

pub type ValidationResult = Result<(), String>;

/// Customer name: 2-100 characters, letters/spaces/basic punctuation.
pub fn validate_customer_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name is required".into());
    }

    if trimmed.len() < 2 || trimmed.len() > 100 {
        return Err("Name must be 2-100 characters".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || ".-'".contains(c))
    {
        return Err("Name may only contain letters, spaces and .-'".into());
    }

    Ok(())
}

/// Mobile number: 8-15 digits after stripping separators.
pub fn validate_mobile(mobile: &str) -> ValidationResult {
    let trimmed = mobile.trim();

    if trimmed.is_empty() {
        return Err("Mobile number is required".into());
    }

    if !trimmed
        .chars()
        .all(|c| c.is_numeric() || "+- ()".contains(c))
    {
        return Err("Mobile number contains invalid characters".into());
    }

    let digits: String = trimmed.chars().filter(|c| c.is_numeric()).collect();
    if digits.len() < 8 || digits.len() > 15 {
        return Err("Mobile number must be 8-15 digits".into());
    }

    Ok(())
}

/// Basic email shape check.
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err("Email is required".into());
    }

    if trimmed.len() > 254 {
        return Err("Email is too long (max 254 characters)".into());
    }

    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 {
        return Err("Invalid email format".into());
    }

    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() || local.len() > 64 {
        return Err("Invalid email format".into());
    }
    if !domain.contains('.') {
        return Err("Invalid email domain".into());
    }

    Ok(())
}

/// OTP: exactly 6 digits.
pub fn validate_otp(otp: &str) -> ValidationResult {
    let trimmed = otp.trim();

    if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("Enter the 6-digit code sent to your mobile".into());
    }

    Ok(())
}

/// Redemption code shape: non-empty, bounded, alphanumeric with hyphens.
pub fn validate_redemption_code(code: &str) -> ValidationResult {
    let trimmed = code.trim();

    if trimmed.is_empty() {
        return Err("Enter a redemption code".into());
    }

    if trimmed.len() > 64 {
        return Err("Redemption code is too long".into());
    }

    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err("Redemption code may only contain letters, numbers and hyphens".into());
    }

    Ok(())
}

/// All three claim-form fields together.
pub fn validate_customer_details(details: &CustomerDetails) -> ValidationResult {
    validate_customer_name(&details.customer_name)?;
    validate_mobile(&details.customer_mobile)?;
    validate_email(&details.customer_email)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_customer_name("Maria D'Souza").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("X").is_err());
        assert!(validate_customer_name("Robert; DROP TABLE").is_err());
    }

    #[test]
    fn mobile_rules() {
        assert!(validate_mobile("+62 812-3456-789").is_ok());
        assert!(validate_mobile("0812345678").is_ok());
        assert!(validate_mobile("12345").is_err());
        assert!(validate_mobile("call-me-maybe").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("guest@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("x@nodot").is_err());
    }

    #[test]
    fn otp_must_be_six_digits() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp(" 123456 ").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("1234567").is_err());
        assert!(validate_otp("12a456").is_err());
    }

    #[test]
    fn redemption_code_shape() {
        assert!(validate_redemption_code("ABC12345").is_ok());
        assert!(validate_redemption_code("RDM-2026-0001").is_ok());
        assert!(validate_redemption_code("").is_err());
        assert!(validate_redemption_code("bad code!").is_err());
    }
}
