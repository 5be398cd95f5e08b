//! In-memory document sessions.
//!
//! One session per document holds its edit history, refinement context, and
//! export outcome log. A refinement or export is an exclusive operation on
//! its session: while one is in flight the session accepts no other, and
//! sessions for different documents are fully independent.
//!
//! Cancellation is epoch-based. Every accepted operation carries the
//! session's epoch at acceptance time; cancelling (or superseding) bumps the
//! epoch, so a result arriving afterwards fails the epoch check and is
//! discarded instead of committed. History therefore only ever reflects the
//! most recently accepted result, never a stale one.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::export::outcome::{ExportOutcome, OutcomeLog};
use crate::history::{EditHistory, HistoryBoundary};
use crate::models::contact::ContactData;
use crate::models::document::DocumentState;
use crate::refinement::intent::RefinementContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("document session {0} not found")]
    NotFound(Uuid),

    #[error("another operation is in flight for document {0}")]
    OperationInFlight(Uuid),
}

/// Whether an operation's result made it into history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Committed,
    /// The operation was cancelled or superseded while in flight; its result
    /// was discarded and history is unchanged.
    Discarded,
}

/// Grants the holder the right to complete one exclusive operation.
#[derive(Debug, Clone, Copy)]
pub struct OpTicket {
    pub document_id: Uuid,
    epoch: u64,
}

#[derive(Debug)]
pub struct DocumentSession {
    pub user_id: Uuid,
    pub history: EditHistory,
    pub context: RefinementContext,
    pub contact: ContactData,
    pub outcomes: OutcomeLog,
    epoch: u64,
    operation_in_flight: bool,
}

/// All live sessions, keyed by document id.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<Uuid, DocumentSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with its first committed state and returns the new
    /// document id.
    pub async fn create(
        &self,
        user_id: Uuid,
        initial: DocumentState,
        context: RefinementContext,
        contact: ContactData,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut history = EditHistory::new();
        history.commit(initial);

        let session = DocumentSession {
            user_id,
            history,
            context,
            contact,
            outcomes: OutcomeLog::new(),
            epoch: 0,
            operation_in_flight: false,
        };
        self.inner.lock().await.insert(id, session);
        id
    }

    /// Rehydrates a session from its persisted head under the original
    /// document id, e.g. after a service restart. Leaves any live session
    /// untouched.
    pub async fn restore(&self, id: Uuid, user_id: Uuid, head: DocumentState) {
        let mut sessions = self.inner.lock().await;
        sessions.entry(id).or_insert_with(|| {
            let mut history = EditHistory::new();
            history.commit(head);
            DocumentSession {
                user_id,
                history,
                context: RefinementContext::default(),
                contact: ContactData::default(),
                outcomes: OutcomeLog::new(),
                epoch: 0,
                operation_in_flight: false,
            }
        });
    }

    /// Runs a closure against a session. Cursor moves and other synchronous
    /// accesses go through here.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut DocumentSession) -> R,
    ) -> Result<R, SessionError> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        Ok(f(session))
    }

    /// Accepts an exclusive operation on the document, or refuses if one is
    /// already in flight.
    pub async fn begin_operation(&self, id: Uuid) -> Result<OpTicket, SessionError> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        if session.operation_in_flight {
            return Err(SessionError::OperationInFlight(id));
        }
        session.operation_in_flight = true;
        Ok(OpTicket {
            document_id: id,
            epoch: session.epoch,
        })
    }

    /// Commits an operation's resulting state, unless the ticket's epoch is
    /// stale — then the result is discarded and history is left untouched.
    pub async fn commit_result(
        &self,
        ticket: OpTicket,
        state: DocumentState,
    ) -> Result<CommitStatus, SessionError> {
        let mut sessions = self.inner.lock().await;
        let session = sessions
            .get_mut(&ticket.document_id)
            .ok_or(SessionError::NotFound(ticket.document_id))?;

        if session.epoch != ticket.epoch {
            return Ok(CommitStatus::Discarded);
        }

        session.history.commit(state);
        session.operation_in_flight = false;
        session.epoch += 1;
        Ok(CommitStatus::Committed)
    }

    /// Releases an operation without committing (failed refinement, export
    /// completion). A stale ticket is a no-op: the cancel already released.
    pub async fn finish_operation(&self, ticket: OpTicket) -> Result<(), SessionError> {
        let mut sessions = self.inner.lock().await;
        let session = sessions
            .get_mut(&ticket.document_id)
            .ok_or(SessionError::NotFound(ticket.document_id))?;
        if session.epoch == ticket.epoch {
            session.operation_in_flight = false;
        }
        Ok(())
    }

    /// Cancels whatever is in flight: bumps the epoch so the in-flight
    /// result will be discarded on arrival, and frees the session for the
    /// next operation.
    pub async fn cancel(&self, id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.epoch += 1;
        session.operation_in_flight = false;
        Ok(())
    }

    /// Records an export outcome on the session's diagnostic log.
    pub async fn record_outcome(
        &self,
        id: Uuid,
        outcome: ExportOutcome,
    ) -> Result<(), SessionError> {
        self.with_session(id, |s| s.outcomes.record(outcome)).await
    }

    /// Cursor move helpers: boundary signals are data, not errors.
    pub async fn undo(
        &self,
        id: Uuid,
    ) -> Result<Result<DocumentState, HistoryBoundary>, SessionError> {
        self.with_session(id, |s| s.history.undo().cloned()).await
    }

    pub async fn redo(
        &self,
        id: Uuid,
    ) -> Result<Result<DocumentState, HistoryBoundary>, SessionError> {
        self.with_session(id, |s| s.history.redo().cloned()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(markup: &str) -> DocumentState {
        DocumentState::new(markup, "summary")
    }

    async fn registry_with_doc() -> (SessionRegistry, Uuid) {
        let registry = SessionRegistry::new();
        let id = registry
            .create(
                Uuid::new_v4(),
                state("A"),
                RefinementContext::default(),
                ContactData::default(),
            )
            .await;
        (registry, id)
    }

    #[tokio::test]
    async fn test_create_commits_initial_state() {
        let (registry, id) = registry_with_doc().await;
        let markup = registry
            .with_session(id, |s| s.history.current().unwrap().markup.clone())
            .await
            .unwrap();
        assert_eq!(markup, "A");
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let registry = SessionRegistry::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            registry.begin_operation(missing).await.unwrap_err(),
            SessionError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_second_operation_refused_while_first_in_flight() {
        let (registry, id) = registry_with_doc().await;
        let _ticket = registry.begin_operation(id).await.unwrap();
        assert_eq!(
            registry.begin_operation(id).await.unwrap_err(),
            SessionError::OperationInFlight(id)
        );
    }

    #[tokio::test]
    async fn test_operations_on_different_documents_are_independent() {
        let registry = SessionRegistry::new();
        let id_a = registry
            .create(
                Uuid::new_v4(),
                state("A"),
                RefinementContext::default(),
                ContactData::default(),
            )
            .await;
        let id_b = registry
            .create(
                Uuid::new_v4(),
                state("B"),
                RefinementContext::default(),
                ContactData::default(),
            )
            .await;

        let _ticket_a = registry.begin_operation(id_a).await.unwrap();
        assert!(
            registry.begin_operation(id_b).await.is_ok(),
            "a lock on one document must not block another"
        );
    }

    #[tokio::test]
    async fn test_commit_appends_and_releases() {
        let (registry, id) = registry_with_doc().await;
        let ticket = registry.begin_operation(id).await.unwrap();
        let status = registry.commit_result(ticket, state("B")).await.unwrap();
        assert_eq!(status, CommitStatus::Committed);

        let (markup, len) = registry
            .with_session(id, |s| {
                (s.history.current().unwrap().markup.clone(), s.history.len())
            })
            .await
            .unwrap();
        assert_eq!(markup, "B");
        assert_eq!(len, 2);

        // Lock released: a new operation may begin.
        assert!(registry.begin_operation(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_operation_result_is_discarded() {
        let (registry, id) = registry_with_doc().await;
        let ticket = registry.begin_operation(id).await.unwrap();

        // User cancels while the external call is still running.
        registry.cancel(id).await.unwrap();

        let status = registry.commit_result(ticket, state("STALE")).await.unwrap();
        assert_eq!(status, CommitStatus::Discarded);

        let markup = registry
            .with_session(id, |s| s.history.current().unwrap().markup.clone())
            .await
            .unwrap();
        assert_eq!(markup, "A", "stale result must never reach history");
    }

    #[tokio::test]
    async fn test_new_operation_after_cancel_commits_normally() {
        let (registry, id) = registry_with_doc().await;
        let stale_ticket = registry.begin_operation(id).await.unwrap();
        registry.cancel(id).await.unwrap();

        let fresh_ticket = registry.begin_operation(id).await.unwrap();
        assert_eq!(
            registry
                .commit_result(fresh_ticket, state("FRESH"))
                .await
                .unwrap(),
            CommitStatus::Committed
        );
        // The stale result arrives last and is still discarded.
        assert_eq!(
            registry
                .commit_result(stale_ticket, state("STALE"))
                .await
                .unwrap(),
            CommitStatus::Discarded
        );

        let markup = registry
            .with_session(id, |s| s.history.current().unwrap().markup.clone())
            .await
            .unwrap();
        assert_eq!(markup, "FRESH");
    }

    #[tokio::test]
    async fn test_finish_without_commit_releases_lock() {
        let (registry, id) = registry_with_doc().await;
        let ticket = registry.begin_operation(id).await.unwrap();
        registry.finish_operation(ticket).await.unwrap();
        assert!(registry.begin_operation(id).await.is_ok());

        let len = registry.with_session(id, |s| s.history.len()).await.unwrap();
        assert_eq!(len, 1, "failed operation must not touch history");
    }

    #[tokio::test]
    async fn test_undo_redo_round_trip() {
        let (registry, id) = registry_with_doc().await;
        let ticket = registry.begin_operation(id).await.unwrap();
        registry.commit_result(ticket, state("B")).await.unwrap();

        let undone = registry.undo(id).await.unwrap().unwrap();
        assert_eq!(undone.markup, "A");
        let redone = registry.redo(id).await.unwrap().unwrap();
        assert_eq!(redone.markup, "B");
        assert_eq!(
            registry.redo(id).await.unwrap().unwrap_err(),
            HistoryBoundary::AtHistoryEnd
        );
    }
}
