//! # Validation Module
//!
//! Channel ID validation for hubwatch.
//!
//! ## Channel ID Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  U C X u q S B l H A E 6 X w - y e J A 0 T u n w                         │
//! │  └┬┘ └──────────────────┬──────────────────────┘                        │
//! │ prefix          22 chars of [A-Za-z0-9_-]                               │
//! │ 2 letters                                                               │
//! │                                                                         │
//! │  Total: exactly 24 ASCII characters                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation runs before the store or hub is touched, so a malformed ID
//! never costs any I/O.

use crate::error::ValidationError;
use crate::CHANNEL_ID_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const FIELD: &str = "channel_id";

/// Validates a channel ID.
///
/// ## Rules
/// - Must not be empty
/// - Exactly 24 ASCII characters
/// - First two characters are letters
/// - Remaining 22 are letters, digits, `-` or `_`
///
/// ## Example
/// ```rust
/// use hubwatch_core::validation::validate_channel_id;
///
/// assert!(validate_channel_id("UCXuqSBlHAE6Xw-yeJA0Tunw").is_ok());
/// assert!(validate_channel_id("UC123").is_err());
/// assert!(validate_channel_id("").is_err());
/// ```
pub fn validate_channel_id(channel_id: &str) -> ValidationResult<()> {
    if channel_id.is_empty() {
        return Err(ValidationError::Required {
            field: FIELD.to_string(),
        });
    }

    if !is_valid_channel_id(channel_id) {
        return Err(ValidationError::InvalidFormat {
            field: FIELD.to_string(),
            reason: format!(
                "expected {} characters: a two-letter prefix followed by 22 letters, digits, '-' or '_'",
                CHANNEL_ID_LEN
            ),
        });
    }

    Ok(())
}

/// Returns true if `channel_id` has the fixed channel ID shape.
pub fn is_valid_channel_id(channel_id: &str) -> bool {
    let bytes = channel_id.as_bytes();

    if bytes.len() != CHANNEL_ID_LEN {
        return false;
    }

    let (prefix, body) = bytes.split_at(2);

    prefix.iter().all(u8::is_ascii_alphabetic)
        && body
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_')
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channel_ids() {
        assert!(is_valid_channel_id("UCXuqSBlHAE6Xw-yeJA0Tunw"));
        assert!(is_valid_channel_id("UC0000000000000000000001"));
        assert!(is_valid_channel_id("ab______________________"));
        assert!(is_valid_channel_id("UC----------------------"));
    }

    #[test]
    fn test_invalid_channel_ids() {
        assert!(!is_valid_channel_id(""));
        assert!(!is_valid_channel_id("UC123"));
        // 25 characters
        assert!(!is_valid_channel_id("UCXuqSBlHAE6Xw-yeJA0Tunwx"));
        // digit in prefix
        assert!(!is_valid_channel_id("U1XuqSBlHAE6Xw-yeJA0Tunw"));
        // punctuation in body
        assert!(!is_valid_channel_id("UCXuqSBlHAE6Xw.yeJA0Tunw"));
        // multi-byte characters never count as ASCII letters
        assert!(!is_valid_channel_id("ÜCXuqSBlHAE6Xw-yeJA0Tun"));
    }

    #[test]
    fn test_validate_channel_id_errors() {
        assert!(matches!(
            validate_channel_id(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_channel_id("UC123"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_channel_id("UCXuqSBlHAE6Xw-yeJA0Tunw").is_ok());
    }
}
