//! Message Data

use crate::domain::messages::errors::MessageValidationError;

/// A contact form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewMessage {
    /// Trim every field, refusing blanks.
    ///
    /// # Errors
    ///
    /// Returns [`MessageValidationError::MissingField`] naming the first blank field.
    pub fn normalise(self) -> Result<Self, MessageValidationError> {
        let required = |field: &'static str, value: String| {
            let trimmed = value.trim();

            if trimmed.is_empty() {
                Err(MessageValidationError::MissingField(field))
            } else {
                Ok(trimmed.to_owned())
            }
        };

        Ok(Self {
            name: required("name", self.name)?,
            email: required("email", self.email)?,
            message: required("message", self.message)?,
        })
    }
}
