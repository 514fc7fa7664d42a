//! Input validation helpers
//!
//! Centralized text length constants and validator-error flattening.

use validator::{Validate, ValidationErrors};

// ── Text length limits ──────────────────────────────────────────────

/// Free-form names: client, product, submitter, machine
pub const MAX_NAME_LEN: usize = 200;

/// Notes and reasons (order comment, rejection reason)
pub const MAX_NOTE_LEN: usize = 500;

/// Flatten validator output into a single human-readable line.
///
/// "client: client is required; machine_name: machine_name is required"
pub fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .filter_map(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if detail.is_empty() {
                format!("{field} is invalid")
            } else {
                format!("{field}: {detail}")
            }
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Run derive-based validation, flattening failures to one message.
pub fn check<T: Validate>(value: &T) -> Result<(), String> {
    value.validate().map_err(|e| flatten_errors(&e))
}

/// Validate that an optional string, if present, is within the length
/// limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), String> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::OrderDraft;

    fn draft() -> OrderDraft {
        OrderDraft {
            client: "Acme".to_string(),
            initial_product: "Steel".to_string(),
            initial_quantity: 10,
            final_product: None,
            final_quantity: None,
            submitter: "Mohamed".to_string(),
            machine_name: "CNC".to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_check_passes_valid_draft() {
        assert!(check(&draft()).is_ok());
    }

    #[test]
    fn test_flatten_names_every_bad_field() {
        let bad = OrderDraft {
            client: String::new(),
            submitter: String::new(),
            ..draft()
        };
        let message = check(&bad).unwrap_err();
        assert!(message.contains("client"));
        assert!(message.contains("submitter"));
    }

    #[test]
    fn test_optional_text_limit() {
        assert!(validate_optional_text(&None, "comment", 10).is_ok());
        assert!(validate_optional_text(&Some("short".into()), "comment", 10).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(11)), "comment", 10).is_err());
    }
}
