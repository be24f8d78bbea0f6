//! Input validation helpers
//!
//! Text length limits and the required-field check shared by the CRUD handlers.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::{AppError, AppResult, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: menu item, category, inventory item, username
pub const MAX_NAME_LEN: usize = 200;

/// Units and other short labels (kg, g, pcs)
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

// ── Validation helpers ──────────────────────────────────────────────

/// Require a non-blank value within `max_len`, returning it trimmed
pub fn required_text<'a>(value: &'a str, field: &'static str, max_len: usize) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                .with_detail("field", field),
        );
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(value)
}
