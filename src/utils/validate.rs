use std::sync::LazyLock;

use axum::extract::{FromRequest, Request};
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::{error::AppError, extract::AppJson};

static PINCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]\d{5}$").expect("valid pincode regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static TEN_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid phone regex"));

/// JSON body extractor that runs `validator` rules before the handler sees the payload.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(ValidatedJson(value))
    }
}

pub fn is_valid_pincode(pincode: &str) -> bool {
    PINCODE_RE.is_match(pincode)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn is_ten_digit_phone(phone: &str) -> bool {
    TEN_DIGITS_RE.is_match(phone.trim())
}

/// Reduces a free-form phone number to the last ten digits and accepts it only
/// when it follows the Indian mobile plan (leading 6-9).
pub fn normalize_indian_mobile(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() < 10 {
        return None;
    }

    let last_ten = &digits[digits.len() - 10..];

    match last_ten.as_bytes()[0] {
        b'6'..=b'9' => Some(last_ten.to_owned()),
        _ => None,
    }
}

/// Lowercase, hyphen separated slug built from arbitrary text.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }

    slug.trim_end_matches('-').to_owned()
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_numbers_are_normalized_to_last_ten_digits() {
        assert_eq!(
            normalize_indian_mobile("+91-98765-43210").as_deref(),
            Some("9876543210")
        );
        assert_eq!(
            normalize_indian_mobile("8667460935").as_deref(),
            Some("8667460935")
        );
    }

    #[test]
    fn short_or_non_mobile_numbers_are_rejected() {
        assert_eq!(normalize_indian_mobile("12345"), None);
        assert_eq!(normalize_indian_mobile("5123456789"), None);
        assert_eq!(normalize_indian_mobile(""), None);
    }

    #[test]
    fn pincode_must_be_six_digits_without_leading_zero() {
        assert!(is_valid_pincode("641028"));
        assert!(!is_valid_pincode("041028"));
        assert!(!is_valid_pincode("64102"));
        assert!(!is_valid_pincode("6410288"));
        assert!(!is_valid_pincode("64a028"));
    }

    #[test]
    fn email_and_phone_checks() {
        assert!(is_valid_email("sales@example.in"));
        assert!(!is_valid_email("sales@example"));
        assert!(!is_valid_email("no spaces@example.in"));
        assert!(is_ten_digit_phone("9876543210"));
        assert!(!is_ten_digit_phone("98765 43210"));
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  How to Recharge FASTag?  "), "how-to-recharge-fastag");
        assert_eq!(slugify("KYC -- update"), "kyc-update");
    }
}
