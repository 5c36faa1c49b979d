//! Phone number utilities
//!
//! Recipients are opaque strings to the delivery path. These helpers only
//! tidy input and keep full numbers out of the logs.

use once_cell::sync::Lazy;
use regex::Regex;

// E.164: leading +, country code without zero, up to 15 digits
static E164_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is in E.164 format after normalization
pub fn is_e164(phone: &str) -> bool {
    E164_REGEX.is_match(&normalize_phone_number(phone))
}

/// A recipient is deliverable when it still has digits after normalization
pub fn is_deliverable(recipient: &str) -> bool {
    normalize_phone_number(recipient)
        .chars()
        .any(|c| c.is_ascii_digit())
}

/// Mask a phone number for logging (e.g., +155****4567)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_phone_number(phone);
    if normalized.len() >= 8 {
        format!(
            "{}****{}",
            &normalized[0..4],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}

/// Mask each recipient and join them for a single log field
pub fn mask_recipients(recipients: &[String]) -> String {
    recipients
        .iter()
        .map(|r| mask_phone_number(r))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(normalize_phone_number(" 138-1234-5678 "), "13812345678");
    }

    #[test]
    fn test_is_e164() {
        assert!(is_e164("+15551234567"));
        assert!(is_e164("+44 20 7183 8750"));
        assert!(!is_e164("15551234567"));
        assert!(!is_e164("+0123456789"));
    }

    #[test]
    fn test_is_deliverable() {
        assert!(is_deliverable("+15551234567"));
        assert!(!is_deliverable(""));
        assert!(!is_deliverable("  +  "));
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("+15551234567"), "+155****4567");
        assert_eq!(mask_phone_number("13812345678"), "1381****5678");
        assert_eq!(mask_phone_number("12345"), "****");
    }

    #[test]
    fn test_mask_recipients() {
        let recipients = vec!["+15551234567".to_string(), "123".to_string()];
        assert_eq!(mask_recipients(&recipients), "+155****4567,****");
    }
}
