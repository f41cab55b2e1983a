//! HTTP API handlers for ipa-ta

pub mod annotate;
pub mod cache;
pub mod health;
pub mod languages;

pub use annotate::annotate_routes;
pub use cache::cache_routes;
pub use health::{health_routes, root_routes};
pub use languages::language_routes;

use crate::{ApiError, ApiResult};

/// Normalize a language code; 2-3 ASCII letters only
///
/// The code ends up in dataset file names, so anything else is rejected.
pub fn validate_language_code(code: &str) -> ApiResult<String> {
    let code = code.trim();
    let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic());
    if !valid {
        return Err(ApiError::BadRequest(format!(
            "Invalid language code '{}': expected 2-3 letters",
            code
        )));
    }
    Ok(code.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_code() {
        assert_eq!(validate_language_code("en").unwrap(), "en");
        assert_eq!(validate_language_code("HAW").unwrap(), "haw");
        assert_eq!(validate_language_code(" de ").unwrap(), "de");

        for bad in ["", "e", "engl", "e1", "../", "en_", "ü"] {
            assert!(validate_language_code(bad).is_err(), "accepted {:?}", bad);
        }
    }
}
