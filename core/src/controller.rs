//! Create, update and delete against a `ResourceStore`, keeping it in step
//! with the server.
//!
//! # Design
//! `Collection` owns the store for one resource type together with the
//! client and transport that feed it. Creates and updates touch the list only
//! after the server confirms them. Deletes are optimistic: the entry leaves
//! the list before the request is sent, and a failed delete reconciles the
//! list with the server instead of trying to undo the removal locally.
//!
//! Every outcome is also queued as a [`Notice`] for the view to show as a
//! transient notification. Nothing here is fatal: a failed mutation leaves
//! the collection idle and ready for the next attempt. There are no
//! automatic retries.

use thiserror::Error;
use uuid::Uuid;

use crate::client::HrmsClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::resource::Resource;
use crate::store::{LoadState, ResourceStore};
use crate::transport::Transport;
use crate::types::{Attendance, Employee};

/// Where the collection is in its current mutation.
///
/// `Idle → Submitting → {Succeeded, Failed} → Idle`; a failed delete passes
/// through `Reconciling` before returning to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
    Reconciling,
}

/// How a failed delete brings the list back in line with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconciliation {
    /// Re-fetch the whole list. Falls back to the pre-delete snapshot when
    /// the reload fails too.
    #[default]
    Reload,
    /// Restore the list as it was right before the delete.
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A failed load or mutation. Displays as the message to show the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct MutationError {
    pub message: String,
    #[source]
    pub cause: ApiError,
}

/// A delete that has already been applied to the list but not yet sent.
#[must_use = "a pending delete must be passed to `finish_delete`"]
#[derive(Debug, Clone)]
pub struct PendingDelete<R: Resource> {
    id: R::Id,
    request: HttpRequest,
    snapshot: Vec<R>,
}

impl<R: Resource> PendingDelete<R> {
    pub fn id(&self) -> &R::Id {
        &self.id
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

/// The synchronized list of one resource type.
#[derive(Debug)]
pub struct Collection<R: Resource, T: Transport> {
    client: HrmsClient,
    transport: T,
    store: ResourceStore<R>,
    state: MutationState,
    reconciliation: Reconciliation,
    notices: Vec<Notice>,
    /// Ids removed by `begin_delete` whose response has not arrived yet.
    pending_deletes: Vec<R::Id>,
}

impl<R: Resource, T: Transport> Collection<R, T> {
    pub fn new(client: HrmsClient, transport: T) -> Self {
        Self {
            client,
            transport,
            store: ResourceStore::new(),
            state: MutationState::Idle,
            reconciliation: Reconciliation::default(),
            notices: Vec::new(),
            pending_deletes: Vec::new(),
        }
    }

    pub fn with_reconciliation(mut self, reconciliation: Reconciliation) -> Self {
        self.reconciliation = reconciliation;
        self
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    pub fn items(&self) -> &[R] {
        self.store.items()
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    /// `true` while a mutation is in flight; views disable submit meanwhile.
    pub fn is_busy(&self) -> bool {
        self.state != MutationState::Idle
    }

    pub fn client(&self) -> &HrmsClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand queued notifications to the view.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Fetch the full list and replace the store's contents with it.
    ///
    /// On failure the previous items are kept and the store is marked
    /// `LoadState::Failed`.
    #[tracing::instrument(skip_all, fields(resource = R::COLLECTION))]
    pub fn load(&mut self) -> Result<(), MutationError> {
        self.store.set_load_state(LoadState::Loading);
        match self.fetch_list() {
            Ok(items) => {
                tracing::debug!(count = items.len(), "list loaded");
                self.replace_all(items);
                Ok(())
            }
            Err(cause) => {
                let message = R::load_failed_message();
                tracing::warn!(error = %cause, "list load failed");
                self.store.set_load_state(LoadState::Failed(message.clone()));
                self.notices.push(Notice::error(message.clone()));
                Err(MutationError { message, cause })
            }
        }
    }

    fn fetch_list(&self) -> Result<Vec<R>, ApiError> {
        let response = self.transport.execute(self.client.build_list::<R>())?;
        self.client.parse_list(response)
    }

    // -----------------------------------------------------------------------
    // Create / update
    // -----------------------------------------------------------------------

    /// Create a resource. On success it is prepended to the list and
    /// returned; on failure the list is left untouched.
    #[tracing::instrument(skip_all, fields(resource = R::COLLECTION))]
    pub fn create(&mut self, input: &R::Input) -> Result<R, MutationError> {
        self.validate(input)?;
        self.transition(MutationState::Submitting);

        let result = self
            .client
            .build_create::<R>(input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_entity::<R>(response));

        match result {
            Ok(created) => {
                self.store.prepend(created.clone());
                self.succeed(R::created_message());
                Ok(created)
            }
            Err(cause) => {
                self.transition(MutationState::Failed);
                let error = self.reject(cause, &R::save_failed_message());
                self.settle();
                Err(error)
            }
        }
    }

    /// Update a resource. On success the entry with the same id is replaced
    /// in place; every other entry keeps its identity and position.
    #[tracing::instrument(skip_all, fields(resource = R::COLLECTION, %id))]
    pub fn update(&mut self, id: &R::Id, input: &R::Input) -> Result<R, MutationError> {
        self.validate(input)?;
        self.transition(MutationState::Submitting);

        let result = self
            .client
            .build_update::<R>(id, input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_entity::<R>(response));

        match result {
            Ok(updated) => {
                if !self.store.replace(updated.clone()) {
                    tracing::debug!("updated resource is not in the local list");
                }
                self.succeed(R::updated_message());
                Ok(updated)
            }
            Err(cause) => {
                self.transition(MutationState::Failed);
                let error = self.reject(cause, &R::save_failed_message());
                self.settle();
                Err(error)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Optimistically delete `id`: removed from the list at once, then
    /// confirmed with the server.
    pub fn delete(&mut self, id: &R::Id) -> Result<(), MutationError> {
        let pending = self.begin_delete(id);
        self.finish_delete(pending)
    }

    /// First half of [`Collection::delete`]: drop the entry from the list and
    /// prepare the request, without sending it.
    ///
    /// Several deletes may be pending at once. Until a delete is passed to
    /// [`Collection::finish_delete`], its id stays out of the list, even
    /// across reloads, and [`Collection::is_busy`] is `true`. A
    /// `PendingDelete` dropped without being finished leaves it that way for
    /// the life of the collection.
    pub fn begin_delete(&mut self, id: &R::Id) -> PendingDelete<R> {
        let snapshot = self.store.snapshot();
        if self.store.remove(id).is_none() {
            tracing::debug!(resource = R::COLLECTION, %id, "deleting a resource that is not listed");
        }
        self.pending_deletes.push(id.clone());
        self.transition(MutationState::Submitting);
        PendingDelete {
            id: id.clone(),
            request: self.client.build_delete::<R>(id),
            snapshot,
        }
    }

    /// Second half of [`Collection::delete`]: send the request, and on
    /// failure reconcile the list with the server.
    #[tracing::instrument(skip_all, fields(resource = R::COLLECTION, id = %pending.id))]
    pub fn finish_delete(&mut self, pending: PendingDelete<R>) -> Result<(), MutationError> {
        let PendingDelete {
            id,
            request,
            snapshot,
        } = pending;

        let result = self
            .transport
            .execute(request)
            .and_then(|response| self.client.parse_empty(response));

        if let Some(index) = self.pending_deletes.iter().position(|pending| *pending == id) {
            self.pending_deletes.remove(index);
        }

        match result {
            Ok(()) => {
                // A reconciliation for an overlapping delete may have put it back.
                self.store.remove(&id);
                self.succeed(R::deleted_message());
                Ok(())
            }
            Err(cause) => {
                self.transition(MutationState::Failed);
                let error = self.reject(cause, &R::delete_failed_message());
                self.reconcile(snapshot);
                self.settle();
                Err(error)
            }
        }
    }

    fn reconcile(&mut self, snapshot: Vec<R>) {
        self.transition(MutationState::Reconciling);
        match self.reconciliation {
            Reconciliation::Reload => match self.fetch_list() {
                Ok(items) => self.replace_all(items),
                Err(error) => {
                    tracing::warn!(%error, "reload after failed delete failed, restoring snapshot");
                    self.replace_all(snapshot);
                }
            },
            Reconciliation::Snapshot => self.replace_all(snapshot),
        }
    }

    /// Replace the list, keeping ids with a delete in flight out of it.
    fn replace_all(&mut self, items: Vec<R>) {
        let pending = &self.pending_deletes;
        let items = items
            .into_iter()
            .filter(|item| !pending.contains(item.id()))
            .collect();
        self.store.replace_all(items);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn validate(&mut self, input: &R::Input) -> Result<(), MutationError> {
        R::validate(input).map_err(|message| self.reject(ApiError::Invalid(message), ""))
    }

    fn succeed(&mut self, message: String) {
        self.transition(MutationState::Succeeded);
        self.notices.push(Notice::success(message));
        self.settle();
    }

    /// Back to `Idle`, unless a delete is still waiting for its response.
    fn settle(&mut self) {
        if self.pending_deletes.is_empty() {
            self.transition(MutationState::Idle);
        } else {
            self.transition(MutationState::Submitting);
        }
    }

    fn reject(&mut self, cause: ApiError, fallback: &str) -> MutationError {
        let message = cause.user_message(fallback);
        tracing::warn!(error = %cause, %message, "mutation failed");
        self.notices.push(Notice::error(message.clone()));
        MutationError { message, cause }
    }

    fn transition(&mut self, next: MutationState) {
        tracing::trace!(from = ?self.state, to = ?next, "mutation state");
        self.state = next;
    }
}

impl<T: Transport> Collection<Employee, T> {
    /// Employees whose name or employee id contains `query`, ignoring case.
    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Employee> + 'a {
        self.store.filter(move |employee| employee.matches(query))
    }
}

impl<T: Transport> Collection<Attendance, T> {
    /// One employee's attendance history, newest first. Read-only: the
    /// collection's own list is not touched.
    pub fn employee_history(&self, employee: Uuid) -> Result<Vec<Attendance>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_employee_attendance(employee))?;
        self.client.parse_list(response)
    }
}
