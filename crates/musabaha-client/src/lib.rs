//! REST client and admin panel models for the Musabaha backend
//!
//! [`ResourcePanel`] implements the fetch, confirm, mutate and refetch loop
//! once for every [`RemoteResource`]; payments and registrations plug into it.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod confirm;
pub mod error;
pub mod notify;
pub mod panel;
pub mod resource;
pub mod watcher;

pub use api_client::ApiClient;
pub use confirm::{AlwaysConfirm, ConfirmationPrompt, Confirmer};
pub use error::{ClientError, ClientResult};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use panel::{DocumentLink, PaymentPanel, ResourcePanel, TransitionOutcome, UsersPanel};
pub use resource::{HttpVerb, RemoteResource, TransitionRequest};
pub use watcher::{WatchEvent, Watcher};
