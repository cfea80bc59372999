//! # Validation Utilities
//!
//! Account and permission names follow the EOSIO name rules: up to 12
//! characters from `.12345abcdefghijklmnopqrstuvwxyz`, optionally a 13th
//! character from `.12345abcdefghij`, and no trailing dot.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate an EOSIO name (account or permission).
pub fn validate_name(value: &str, field_name: &str) -> Result<(), String> {
    validate_not_empty(value, field_name)?;

    if value.len() > 13 {
        return Err(format!("{} must be at most 13 characters", field_name));
    }

    for (i, c) in value.chars().enumerate() {
        let allowed = if i == 12 {
            matches!(c, '.' | '1'..='5' | 'a'..='j')
        } else {
            matches!(c, '.' | '1'..='5' | 'a'..='z')
        };
        if !allowed {
            return Err(format!("{} contains invalid character '{}'", field_name, c));
        }
    }

    if value.ends_with('.') {
        return Err(format!("{} cannot end with '.'", field_name));
    }

    Ok(())
}

/// Validate an account name (the `actor` of a session).
pub fn validate_account_name(value: &str) -> Result<(), String> {
    validate_name(value, "Account name")
}

/// Validate a permission name.
pub fn validate_permission_name(value: &str) -> Result<(), String> {
    validate_name(value, "Permission")
}
