use crate::services::error::TrackerError;

/// Input validation for all user-provided data.
pub struct InputValidator;

impl InputValidator {
    /// Validate and trim task text.
    pub fn validate_task_text(text: &str) -> Result<String, TrackerError> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(invalid("text", "cannot be empty"));
        }

        if trimmed.len() > 500 {
            return Err(invalid("text", "cannot exceed 500 characters"));
        }

        // Remove any control characters
        let sanitized = trimmed
            .chars()
            .filter(|c| !c.is_control() || c.is_whitespace())
            .collect::<String>();

        Ok(sanitized)
    }

    pub fn validate_username(username: &str) -> Result<String, TrackerError> {
        let trimmed = username.trim();

        if trimmed.is_empty() {
            return Err(invalid("username", "cannot be empty"));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("username", "cannot contain whitespace"));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_link_title(title: &str) -> Result<String, TrackerError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(invalid("title", "cannot be empty"));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_link_url(url: &str) -> Result<String, TrackerError> {
        let trimmed = url.trim();

        if trimmed.is_empty() {
            return Err(invalid("url", "cannot be empty"));
        }

        Ok(trimmed.to_string())
    }
}

fn invalid(field: &str, reason: &str) -> TrackerError {
    TrackerError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
