//! In-memory model of an admin panel
//!
//! A panel owns the last successfully fetched list for one resource. Failed
//! fetches leave that list untouched and record the error instead.

use crate::api_client::ApiClient;
use crate::confirm::Confirmer;
use crate::error::{ClientError, ClientResult};
use crate::resource::RemoteResource;
use musabaha_core::{
    AggregateStats, ApprovalStatus, AssetResolver, DocumentKind, PaymentRecord, RecordId,
    StatusFilter, UserRegistration,
};
use tracing::{info, warn};

/// Result of a status change that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The administrator declined; nothing was sent
    Declined,
    /// The backend accepted the change
    Applied {
        /// Whether the follow-up reload succeeded
        refreshed: bool,
    },
}

/// Admin panel over one resource list
#[derive(Debug, Clone)]
pub struct ResourcePanel<R: RemoteResource> {
    client: ApiClient,
    records: Vec<R>,
    loading: bool,
    last_error: Option<String>,
}

/// Payment approval panel
pub type PaymentPanel = ResourcePanel<PaymentRecord>;

/// Registered users panel
pub type UsersPanel = ResourcePanel<UserRegistration>;

impl<R: RemoteResource> ResourcePanel<R> {
    /// Create an empty panel
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            records: Vec::new(),
            loading: false,
            last_error: None,
        }
    }

    /// Client used for requests
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Records from the last successful fetch
    #[must_use]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the most recent failed fetch, cleared by a successful one
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Record with the given id
    #[must_use]
    pub fn find(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Records passing a status filter, in list order
    pub fn filtered(&self, filter: StatusFilter) -> impl Iterator<Item = &R> + '_ {
        self.records
            .iter()
            .filter(move |record| filter.matches(record.status()))
    }

    /// Replace the list with a fresh copy from the backend
    ///
    /// On failure the previous list is kept and the error is remembered.
    /// The loading flag is cleared even if the returned future is dropped
    /// before completion.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    pub async fn refresh(&mut self) -> ClientResult<usize> {
        let loading = LoadingFlag::raise(&mut self.loading);
        let result = self
            .client
            .fetch_list::<R>(R::LIST_PATH, R::REQUIRES_AUTH, R::NAME)
            .await;
        drop(loading);

        match result {
            Ok(records) => {
                let count = records.len();
                info!(resource = R::NAME, count, "List loaded");
                self.records = records;
                self.last_error = None;
                Ok(count)
            }
            Err(e) => {
                warn!(
                    resource = R::NAME,
                    kept = self.records.len(),
                    error = %e,
                    "List fetch failed, keeping previous records"
                );
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Move a record to `target` after confirmation
    ///
    /// The transition is checked against the local copy first. If the
    /// administrator declines, nothing is sent. After the backend accepts,
    /// the local record is patched and the whole list reloaded; a failed
    /// reload keeps the patched list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidTransition` before prompting, or the
    /// request error if the backend call fails. State is unchanged on error.
    pub async fn update_status(
        &mut self,
        id: &RecordId,
        target: ApprovalStatus,
        confirmer: &dyn Confirmer,
    ) -> ClientResult<TransitionOutcome> {
        let current = self
            .find(id)
            .map(R::status)
            .ok_or_else(|| ClientError::NotFound {
                resource: R::NAME,
                id: id.clone(),
            })?;

        let invalid = || ClientError::InvalidTransition {
            resource: R::NAME,
            id: id.clone(),
            from: current,
            to: target,
        };
        if !R::can_transition(current, target) {
            return Err(invalid());
        }
        let request = R::transition_request(id, target).ok_or_else(invalid)?;

        let prompt = R::confirmation_prompt(id, target);
        if !confirmer.confirm(&prompt).await {
            info!(resource = R::NAME, %id, status = %target, "Status change declined");
            return Ok(TransitionOutcome::Declined);
        }

        if let Err(e) = self
            .client
            .send_transition(&request, R::REQUIRES_AUTH, R::NAME)
            .await
        {
            warn!(resource = R::NAME, %id, status = %target, error = %e, "Status change failed");
            return Err(e);
        }
        info!(resource = R::NAME, %id, status = %target, "Status changed");

        if let Some(record) = self.records.iter_mut().find(|record| record.id() == id) {
            record.set_status(target);
        }

        let refreshed = self.refresh().await.is_ok();
        Ok(TransitionOutcome::Applied { refreshed })
    }
}

/// Holds the loading flag up until dropped
struct LoadingFlag<'a>(&'a mut bool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl ResourcePanel<PaymentRecord> {
    /// Totals over the current list
    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        AggregateStats::from_payments(&self.records)
    }
}

/// A registration document with its public URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// Document kind
    pub kind: DocumentKind,
    /// Path as stored by the backend
    pub stored: String,
    /// Public URL, if the stored value resolves to one
    pub url: Option<String>,
}

impl ResourcePanel<UserRegistration> {
    /// Uploaded documents of a registration with resolved URLs
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the registration is not loaded.
    pub fn document_links(
        &self,
        id: &RecordId,
        resolver: &AssetResolver,
    ) -> ClientResult<Vec<DocumentLink>> {
        let user = self.find(id).ok_or_else(|| ClientError::NotFound {
            resource: UserRegistration::NAME,
            id: id.clone(),
        })?;

        Ok(user
            .documents()
            .map(|(kind, stored)| DocumentLink {
                kind,
                stored: stored.to_string(),
                url: resolver.document_url(stored),
            })
            .collect())
    }
}
