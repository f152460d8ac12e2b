//! Input checks shared by the organization unit creation DTOs.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::error::{field_errors, DomainError, DomainResult, FieldErrors};

/// Creation payload of a hierarchy entity.
pub trait UnitInput: Validate + Send + Sync + 'static {
    type Entity;

    /// Explicitly requested code, if any
    fn code(&self) -> Option<&str>;

    fn name(&self) -> &str;

    /// `(active_from, active_until)` as supplied
    fn window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>);

    /// Build the entity, filling in defaults.
    fn into_entity(self, id: String, code: String, actor: &str) -> Self::Entity;

    /// Run field validation, name shape and active window checks together.
    fn check(&self) -> DomainResult<()> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if self.name().trim().is_empty() {
            errors
                .entry("name".to_string())
                .or_insert_with(|| "Name is required".to_string());
        }

        let (from, until) = self.window();
        if let Err(msg) = check_window(from, until) {
            errors.insert("active_until".to_string(), msg.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Invalid(errors))
        }
    }
}

/// `active_until` must fall after `active_from` (which defaults to now).
pub fn check_window(
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<(), &'static str> {
    match until {
        Some(until) if until <= from.unwrap_or_else(Utc::now) => {
            Err("Active until must be after active from")
        }
        _ => Ok(()),
    }
}
