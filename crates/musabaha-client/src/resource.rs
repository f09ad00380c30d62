//! Record kinds managed by the admin panels
//!
//! Each panel is the same fetch, confirm, mutate, refetch loop. What differs is
//! captured here: where the list lives, whether it needs a token, which status
//! changes are legal and how the backend expects them to be requested.

use crate::confirm::ConfirmationPrompt;
use crate::error::ClientError;
use musabaha_core::{ApprovalStatus, PaymentRecord, RecordId, UserRegistration};
use serde::de::DeserializeOwned;

/// HTTP method used for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    /// `PATCH` with a JSON body
    Patch,
    /// `PUT` without a body
    Put,
}

/// A fully described status-change call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// HTTP method
    pub verb: HttpVerb,
    /// Path relative to the API base URL
    pub path: String,
    /// JSON body, if the endpoint takes one
    pub body: Option<musabaha_core::types::StatusUpdate>,
}

/// A record type served by the backend and reviewed by an administrator
pub trait RemoteResource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Short lowercase name used in logs and errors
    const NAME: &'static str;

    /// Capitalized name used in notifications
    const LABEL: &'static str;

    /// Path of the list endpoint
    const LIST_PATH: &'static str;

    /// Whether the endpoints need a bearer token
    const REQUIRES_AUTH: bool;

    /// Shown while the list is being fetched
    const LOADING_TEXT: &'static str;

    /// Record identifier
    fn id(&self) -> &RecordId;

    /// Current review status
    fn status(&self) -> ApprovalStatus;

    /// Overwrite the review status after a confirmed change
    fn set_status(&mut self, status: ApprovalStatus);

    /// Whether a record in `from` may be moved to `to`
    fn can_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool;

    /// Request that moves record `id` to `target`
    ///
    /// `None` when the backend has no endpoint for that target.
    fn transition_request(id: &RecordId, target: ApprovalStatus) -> Option<TransitionRequest>;

    /// Prompt shown before a status change
    fn confirmation_prompt(id: &RecordId, target: ApprovalStatus) -> ConfirmationPrompt {
        ConfirmationPrompt::new(
            "Are you sure?",
            format!(
                "Do you want to mark {} {id} as \"{target}\"?",
                Self::NAME
            ),
            format!("Yes, {target}!"),
        )
    }

    /// Notification text after a successful change
    fn success_text(target: ApprovalStatus) -> String {
        format!("{} status updated to {target}", Self::LABEL)
    }

    /// Notification text after a failed change
    fn failure_text(target: ApprovalStatus, error: &ClientError) -> String {
        format!("Could not mark {} as {target}: {error}", Self::NAME)
    }
}

fn encode_id(id: &RecordId) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

impl RemoteResource for PaymentRecord {
    const NAME: &'static str = "payment";
    const LABEL: &'static str = "Payment";
    const LIST_PATH: &'static str = "/api/user-subsequent-payments";
    const REQUIRES_AUTH: bool = false;
    const LOADING_TEXT: &'static str = "Loading payments...";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> ApprovalStatus {
        self.status
    }

    fn set_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }

    fn can_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        from == ApprovalStatus::Pending && to != ApprovalStatus::Pending
    }

    fn transition_request(id: &RecordId, target: ApprovalStatus) -> Option<TransitionRequest> {
        (target != ApprovalStatus::Pending).then(|| TransitionRequest {
            verb: HttpVerb::Patch,
            path: format!("{}/{}/status", Self::LIST_PATH, encode_id(id)),
            body: Some(musabaha_core::types::StatusUpdate { status: target }),
        })
    }

    fn confirmation_prompt(_id: &RecordId, target: ApprovalStatus) -> ConfirmationPrompt {
        ConfirmationPrompt::new(
            "Are you sure?",
            format!("Do you want to mark this payment as \"{target}\"?"),
            format!("Yes, {target}!"),
        )
    }

    fn failure_text(_target: ApprovalStatus, error: &ClientError) -> String {
        if error.is_server_refusal() {
            "Failed to update payment status".to_string()
        } else {
            "Error updating payment status".to_string()
        }
    }
}

impl RemoteResource for UserRegistration {
    const NAME: &'static str = "registration";
    const LABEL: &'static str = "Registration";
    const LIST_PATH: &'static str = "/api/subscriptions/all";
    const REQUIRES_AUTH: bool = true;
    const LOADING_TEXT: &'static str = "Loading registered users...";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn status(&self) -> ApprovalStatus {
        self.status
    }

    fn set_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }

    fn can_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        to != ApprovalStatus::Pending && from != to
    }

    fn transition_request(id: &RecordId, target: ApprovalStatus) -> Option<TransitionRequest> {
        let action = match target {
            ApprovalStatus::Approved => "approve",
            ApprovalStatus::Rejected => "reject",
            ApprovalStatus::Pending => return None,
        };
        Some(TransitionRequest {
            verb: HttpVerb::Put,
            path: format!("/api/subscriptions/{}/{action}", encode_id(id)),
            body: None,
        })
    }

    fn confirmation_prompt(id: &RecordId, target: ApprovalStatus) -> ConfirmationPrompt {
        let action = action_verb(target);
        ConfirmationPrompt::new(
            "Are you sure?",
            format!("Do you want to {action} user {id}?"),
            format!("Yes, {action}!"),
        )
    }

    fn failure_text(target: ApprovalStatus, _error: &ClientError) -> String {
        format!("Could not {} user. Please try again.", action_verb(target))
    }
}

const fn action_verb(target: ApprovalStatus) -> &'static str {
    match target {
        ApprovalStatus::Approved => "approve",
        ApprovalStatus::Rejected => "reject",
        ApprovalStatus::Pending => "reset",
    }
}
