use regex::Regex;

use crate::error::{AppError, AppResult};

/// Contact numbers are stored as given (optionally with a `+<country>`
/// prefix) but must be plain phone digits.
pub fn validate_contact(contact: &str) -> AppResult<()> {
    let contact_regex = Regex::new(r"^\+?\d{7,15}$").unwrap();

    if !contact_regex.is_match(contact) {
        return Err(AppError::ValidationError(
            "Contact must be 7-15 digits, optionally prefixed with +".to_string(),
        ));
    }

    Ok(())
}

/// National significant number: the trailing ten digits, which is what
/// auto-created usernames and seed passwords are derived from.
pub fn national_number(contact: &str) -> String {
    let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_contact() {
        assert!(validate_contact("9800000001").is_ok());
        assert!(validate_contact("+9779800000001").is_ok());
        assert!(validate_contact("98-0000-0001").is_err());
        assert!(validate_contact("abc").is_err());
        assert!(validate_contact("").is_err());
    }

    #[test]
    fn test_national_number() {
        assert_eq!(national_number("+9779800000001"), "9800000001");
        assert_eq!(national_number("9800000001"), "9800000001");
        assert_eq!(national_number("12345"), "12345");
    }
}
