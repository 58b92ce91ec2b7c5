//! Built-in field rules.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Non-empty.
pub fn required(value: &str) -> bool {
    !value.is_empty()
}

/// Loose `local@domain.tld` check.
pub fn email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is valid")
    });
    re.is_match(value)
}

/// At least eight characters including a lowercase letter, an uppercase
/// letter, a digit, and a symbol or punctuation character.
pub fn password(value: &str) -> bool {
    let mut total_length = 0;
    let mut contains_lower = false;
    let mut contains_upper = false;
    let mut contains_number = false;
    let mut contains_symbol = false;

    for c in value.chars() {
        if c.is_numeric() {
            contains_number = true;
        } else if c.is_lowercase() {
            contains_lower = true;
        } else if c.is_uppercase() {
            contains_upper = true;
        } else if !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() {
            contains_symbol = true;
        }
        total_length += 1;
    }

    total_length >= MIN_PASSWORD_LEN
        && contains_number
        && contains_symbol
        && contains_upper
        && contains_lower
}

/// Any well-formed UUID, including the nil UUID.
pub fn uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// A well-formed UUID that is not the nil UUID.
pub fn required_uuid(value: &str) -> bool {
    matches!(Uuid::parse_str(value), Ok(id) if !id.is_nil())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength() {
        assert!(password("Abcdef1!"));
        assert!(password("pässWörd9#"));
        assert!(!password("abcdefgh"));
        assert!(!password("Ab1!"));
        assert!(!password("ABCDEFG1!"));
        assert!(!password("Abcdefgh!"));
        assert!(!password("Abcdefgh1"));
        // Whitespace is not a symbol.
        assert!(!password("Abcdef1 "));
    }

    #[test]
    fn test_uuid_rules() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert!(uuid(id));
        assert!(required_uuid(id));

        let nil = "00000000-0000-0000-0000-000000000000";
        assert!(uuid(nil));
        assert!(!required_uuid(nil));

        assert!(!uuid("not-a-uuid"));
        assert!(!required_uuid(""));
    }

    #[test]
    fn test_email() {
        assert!(email("someone@example.com"));
        assert!(email("first.last+tag@sub.example.co.uk"));
        assert!(!email("someone@localhost"));
        assert!(!email("no-at-sign.example.com"));
        assert!(!email(""));
    }

    #[test]
    fn test_required() {
        assert!(required("x"));
        assert!(required(" "));
        assert!(!required(""));
    }
}
