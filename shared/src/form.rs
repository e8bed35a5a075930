use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CreateValentineRequest, EmployeeId, ImageId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("recipient is not chosen")]
    MissingRecipient,
    #[error("image is not chosen")]
    MissingImage,
    #[error("text is blank")]
    BlankText,
}

/// Draft of the card being composed. Lives for the whole session and is reset when the wizard
/// starts over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub recipient_id: Option<EmployeeId>,
    pub image_id: Option<ImageId>,
    pub text: String,
    pub is_anonymous: bool,
    pub anonymous_signature: String,
    placeholder: String,
}

impl FormState {
    #[must_use]
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        Self {
            recipient_id: None,
            image_id: None,
            text: String::new(),
            is_anonymous: true,
            anonymous_signature: placeholder.clone(),
            placeholder,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.recipient_id.is_some() && self.image_id.is_some() && !self.text.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.placeholder));
    }

    pub fn to_create_request(&self) -> Result<CreateValentineRequest, FormError> {
        let recipient = self.recipient_id.ok_or(FormError::MissingRecipient)?;
        let image = self.image_id.ok_or(FormError::MissingImage)?;
        if self.text.trim().is_empty() {
            return Err(FormError::BlankText);
        }

        Ok(CreateValentineRequest {
            recipient,
            image,
            text: self.text.clone(),
            is_anonymously: self.is_anonymous,
            anonymous_signature: self.anonymous_signature.clone(),
        })
    }

    /// Sender as shown on the check step.
    #[must_use]
    pub fn sender_line(&self) -> String {
        crate::model::sender_line(self.is_anonymous, &self.anonymous_signature)
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(crate::config::ANONYMOUS_PLACEHOLDER)
    }
}

#[must_use]
pub fn is_valid_text(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() >= min_len
}

#[must_use]
pub fn is_valid_signature(signature: &str, min_len: usize) -> bool {
    signature.trim().chars().count() >= min_len
}
