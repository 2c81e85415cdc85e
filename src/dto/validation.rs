//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted length for user ids and display names.
const MAX_IDENTITY_LEN: usize = 64;

/// Validates that a user id is 1-64 visible characters without whitespace.
pub fn validate_user_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MAX_IDENTITY_LEN {
        let mut err = ValidationError::new("user_id_length");
        err.message = Some(format!("User id must be 1-{MAX_IDENTITY_LEN} characters").into());
        return Err(err);
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        let mut err = ValidationError::new("user_id_format");
        err.message = Some("User id must not contain whitespace or control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is non-blank and at most 64 characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() || name.len() > MAX_IDENTITY_LEN {
        let mut err = ValidationError::new("display_name");
        err.message =
            Some(format!("Display name must be 1-{MAX_IDENTITY_LEN} non-blank characters").into());
        return Err(err);
    }
    Ok(())
}

/// Validates a user-chosen room code: 4-12 ASCII letters or digits.
///
/// Codes are canonicalized to upper case by the room registry, so both cases
/// are accepted here.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    let trimmed = code.trim();
    if trimmed.len() < 4 || trimmed.len() > 12 {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(format!("Room code must be 4-12 characters (got {})", trimmed.len()).into());
        return Err(err);
    }

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only ASCII letters and digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id_valid() {
        assert!(validate_user_id("ada").is_ok());
        assert!(validate_user_id("user-42_x").is_ok());
        assert!(validate_user_id(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_validate_user_id_invalid() {
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id(&"a".repeat(65)).is_err());
        assert!(validate_user_id("with space").is_err());
        assert!(validate_user_id("tab\there").is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Ada L.").is_ok());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("ABC123").is_ok());
        assert!(validate_room_code("abc123").is_ok()); // canonicalized later
        assert!(validate_room_code("DUEL").is_ok());
        assert!(validate_room_code("  ABC123  ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_room_code_invalid() {
        assert!(validate_room_code("abc").is_err()); // too short
        assert!(validate_room_code("ABCDEF1234567").is_err()); // too long
        assert!(validate_room_code("ABC 12").is_err()); // inner space
        assert!(validate_room_code("ABC-12").is_err()); // punctuation
    }
}
