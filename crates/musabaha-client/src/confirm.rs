//! Confirmation gate for status changes

use async_trait::async_trait;

/// Text of a yes/no question put to the administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPrompt {
    /// Short heading
    pub title: String,
    /// The question
    pub text: String,
    /// Label of the affirmative answer
    pub confirm_label: String,
    /// Label of the negative answer
    pub cancel_label: String,
}

impl ConfirmationPrompt {
    /// Create a prompt with the default cancel label
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        confirm_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            confirm_label: confirm_label.into(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Asks the administrator to confirm an action
///
/// Implementations must not assume a particular front end: the terminal
/// prompt, an always-yes policy for `--yes`, and test doubles all implement
/// this trait.
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// Return `true` to proceed
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool;
}

/// Confirms everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl Confirmer for AlwaysConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        tracing::debug!(question = %prompt.text, "Confirmation skipped");
        true
    }
}
