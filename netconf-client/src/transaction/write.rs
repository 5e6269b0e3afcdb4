//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use netconf_utils::task::Task;
use netconf_yang::{
    DataNode, EffectiveOperation, ErrorSeverity, ErrorTag, ErrorType,
    InstancePath, LogicalDatastoreType,
};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::RemoteDeviceId;
use crate::capabilities::Capabilities;
use crate::debug::Debug;
use crate::error::{CommitFailed, DocumentedError, Error};
use crate::ops::NetconfBaseOps;
use crate::rpc::{Datastore, EditStructure, RpcFuture};
use crate::transaction::status::results_to_tx_status;
use crate::transaction::{TxId, TxListener};

// Future of a commit outcome.
pub type CommitFuture = BoxFuture<'static, Result<(), CommitFailed>>;

/// Write transaction variants, selected from the device capabilities.
///
/// | Variant | Locks | Edits | Cleanup on failure |
/// |---|---|---|---|
/// | `Candidate` | candidate | immediate, on candidate | discard, unlock |
/// | `CandidateRunning` | running, candidate | immediate, on candidate | discard, unlock both |
/// | `CreateCandidateRunning` | as `CandidateRunning`, but `put` creates | | |
/// | `Running` | running | buffered until commit, on running | unlock |
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteTxKind {
    Candidate,
    CandidateRunning,
    CreateCandidateRunning,
    Running,
}

/// NETCONF write transaction.
///
/// The edited datastores are locked when the transaction is created. Edits
/// against the candidate datastore are sent right away, while edits against
/// the running datastore are buffered and only sent on commit.
#[derive(Clone)]
pub struct WriteTx {
    inner: Arc<WriteTxInner>,
}

struct WriteTxInner {
    id: TxId,
    kind: WriteTxKind,
    ops: NetconfBaseOps,
    rollback_on_error: bool,
    lock_allowed: bool,
    state: Mutex<WriteTxState>,
}

#[derive(Default)]
struct WriteTxState {
    // Set exactly once, on cancel or commit.
    finished: bool,
    // Replies of the RPCs issued so far, in issue order.
    results: Vec<RpcFuture>,
    // Edits waiting for the commit (running datastore only).
    changes: Vec<Change>,
    listeners: Vec<(u64, Weak<dyn TxListener>)>,
    next_listener_id: u64,
}

// Buffered edit.
#[derive(Debug)]
struct Change {
    edit: EditStructure,
    default_operation: Option<EffectiveOperation>,
}

/// Handle of a registered [`TxListener`]. Dropping it deregisters the
/// listener.
#[derive(Debug)]
pub struct ListenerRegistration {
    tx: Weak<WriteTxInner>,
    id: u64,
}

// ===== impl WriteTxKind =====

impl WriteTxKind {
    // Selects the transaction variant supported by a device.
    pub fn select(
        capabilities: Capabilities,
        create_on_put: bool,
    ) -> Option<WriteTxKind> {
        let candidate = capabilities.contains(Capabilities::CANDIDATE);
        let running = capabilities.contains(Capabilities::WRITABLE_RUNNING);
        match (candidate, running) {
            (true, true) if create_on_put => {
                Some(WriteTxKind::CreateCandidateRunning)
            }
            (true, true) => Some(WriteTxKind::CandidateRunning),
            (true, false) => Some(WriteTxKind::Candidate),
            (false, true) => Some(WriteTxKind::Running),
            (false, false) => None,
        }
    }

    // Datastores locked on creation, in lock order.
    pub fn lock_order(&self) -> &'static [Datastore] {
        match self {
            WriteTxKind::Candidate => &[Datastore::Candidate],
            WriteTxKind::CandidateRunning
            | WriteTxKind::CreateCandidateRunning => {
                &[Datastore::Running, Datastore::Candidate]
            }
            WriteTxKind::Running => &[Datastore::Running],
        }
    }

    // Datastores unlocked on completion, in unlock order.
    pub fn unlock_order(&self) -> &'static [Datastore] {
        match self {
            WriteTxKind::Candidate => &[Datastore::Candidate],
            WriteTxKind::CandidateRunning
            | WriteTxKind::CreateCandidateRunning => {
                &[Datastore::Candidate, Datastore::Running]
            }
            WriteTxKind::Running => &[Datastore::Running],
        }
    }

    pub fn edit_target(&self) -> Datastore {
        match self {
            WriteTxKind::Running => Datastore::Running,
            _ => Datastore::Candidate,
        }
    }

    pub fn buffers_edits(&self) -> bool {
        *self == WriteTxKind::Running
    }

    pub fn put_operation(&self) -> EffectiveOperation {
        match self {
            WriteTxKind::CreateCandidateRunning => EffectiveOperation::Create,
            _ => EffectiveOperation::Replace,
        }
    }
}

// ===== impl WriteTx =====

impl WriteTx {
    pub fn new(
        kind: WriteTxKind,
        ops: NetconfBaseOps,
        rollback_on_error: bool,
        lock_allowed: bool,
    ) -> WriteTx {
        let id = TxId::next();
        Debug::TxCreate(ops.device(), id, kind).log();

        let mut state = WriteTxState::default();
        if lock_allowed {
            state.results.extend(
                kind.lock_order()
                    .iter()
                    .map(|datastore| ops.lock(*datastore)),
            );
        }

        WriteTx {
            inner: Arc::new(WriteTxInner {
                id,
                kind,
                ops,
                rollback_on_error,
                lock_allowed,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn id(&self) -> TxId {
        self.inner.id
    }

    pub fn kind(&self) -> WriteTxKind {
        self.inner.kind
    }

    pub fn device(&self) -> &RemoteDeviceId {
        self.inner.ops.device()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.state.lock().unwrap().finished
    }

    // Replaces the data at the given path.
    pub fn put(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
    ) -> Result<(), Error> {
        let mut state = self.check_editable(store)?;
        if contains_only_non_visible_data(path, &data) {
            Debug::TxEditIgnored(self.device(), self.id(), "put", path).log();
            return Ok(());
        }

        Debug::TxEdit(self.device(), self.id(), "put", path).log();
        let operation = self.inner.kind.put_operation();
        let edit = self.inner.ops.create_edit_config_structure(
            Some(data),
            Some(operation),
            path,
        );
        self.edit_config(&mut state, edit, None);
        Ok(())
    }

    // Merges the data at the given path with the existing data.
    pub fn merge(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
    ) -> Result<(), Error> {
        let mut state = self.check_editable(store)?;
        if contains_only_non_visible_data(path, &data) {
            Debug::TxEditIgnored(self.device(), self.id(), "merge", path)
                .log();
            return Ok(());
        }

        Debug::TxEdit(self.device(), self.id(), "merge", path).log();
        let edit =
            self.inner
                .ops
                .create_edit_config_structure(Some(data), None, path);
        self.edit_config(&mut state, edit, None);
        Ok(())
    }

    pub fn delete(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> Result<(), Error> {
        let mut state = self.check_editable(store)?;

        Debug::TxEdit(self.device(), self.id(), "delete", path).log();
        let edit = self.inner.ops.create_edit_config_structure(
            None,
            Some(EffectiveOperation::Delete),
            path,
        );
        self.edit_config(&mut state, edit, Some(EffectiveOperation::None));
        Ok(())
    }

    /// Abandons the transaction.
    ///
    /// Returns `false` if the transaction was already finished. Otherwise
    /// pending changes are discarded and the locks released, both without
    /// waiting for the device.
    pub fn cancel(&self) -> bool {
        let results = {
            let mut state = self.inner.state.lock().unwrap();
            if state.finished {
                return false;
            }
            state.finished = true;
            state.changes.clear();
            std::mem::take(&mut state.results)
        };

        Debug::TxCancel(self.device(), self.id()).log();
        self.notify(|listener| listener.on_transaction_cancelled(self));

        // The replies of the RPCs already issued are still logged.
        Task::background(async move {
            let _ = future::join_all(results).await;
        });
        self.cleanup();
        true
    }

    /// Commits the transaction.
    ///
    /// Fails synchronously if the transaction was already finished. The
    /// returned future resolves once the outcome of every RPC issued by the
    /// transaction is known. Within a Tokio runtime, listeners are notified
    /// even if the future is dropped. Outside of one, the future must be
    /// polled to completion for the outcome to be processed.
    pub fn commit(&self) -> Result<CommitFuture, Error> {
        let (results, changes) = {
            let mut state = self.inner.state.lock().unwrap();
            if state.finished {
                return Err(Error::TransactionFinished(self.id()));
            }
            state.finished = true;
            (
                std::mem::take(&mut state.results),
                std::mem::take(&mut state.changes),
            )
        };

        Debug::TxSubmit(self.device(), self.id()).log();
        self.notify(|listener| listener.on_transaction_submitted(self));

        let status = self.perform_commit(results, changes);
        let tx = self.clone();
        let outcome = async move {
            let outcome = status.await.map_err(|cause| CommitFailed {
                tx: tx.id(),
                cause,
            });
            tx.on_commit_outcome(&outcome);
            outcome
        };

        // Without a runtime the outcome is processed by whoever polls the
        // returned future.
        if Handle::try_current().is_err() {
            return Ok(outcome.boxed());
        }

        let (outcome_tx, outcome_rx) = oneshot::channel();
        Task::background(async move {
            let _ = outcome_tx.send(outcome.await);
        });

        let id = self.id();
        Ok(async move {
            outcome_rx.await.unwrap_or_else(|_| {
                Err(CommitFailed {
                    tx: id,
                    cause: DocumentedError::new(
                        "commit aborted",
                        ErrorType::Application,
                        ErrorTag::OperationFailed,
                        ErrorSeverity::Error,
                    ),
                })
            })
        }
        .boxed())
    }

    /// Registers a listener for the lifecycle events of this transaction.
    ///
    /// Only a weak reference is kept, so the listener may own the
    /// transaction.
    pub fn add_listener(
        &self,
        listener: Weak<dyn TxListener>,
    ) -> ListenerRegistration {
        let mut state = self.inner.state.lock().unwrap();
        let id = state.next_listener_id;
        state.next_listener_id += 1;
        state.listeners.push((id, listener));
        ListenerRegistration {
            tx: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn check_editable(
        &self,
        store: LogicalDatastoreType,
    ) -> Result<MutexGuard<'_, WriteTxState>, Error> {
        let state = self.inner.state.lock().unwrap();
        if state.finished {
            return Err(Error::TransactionFinished(self.id()));
        }
        if store != LogicalDatastoreType::Configuration {
            return Err(Error::InvalidStore(store));
        }
        Ok(state)
    }

    fn edit_config(
        &self,
        state: &mut WriteTxState,
        edit: EditStructure,
        default_operation: Option<EffectiveOperation>,
    ) {
        let inner = &self.inner;
        if inner.kind.buffers_edits() {
            state.changes.push(Change {
                edit,
                default_operation,
            });
            return;
        }

        let result = inner.ops.edit_config(
            inner.kind.edit_target(),
            edit,
            default_operation,
            inner.rollback_on_error,
        );
        state.results.push(result);
    }

    // Issues the commit RPCs and returns the aggregated outcome of the whole
    // transaction.
    fn perform_commit(
        &self,
        mut results: Vec<RpcFuture>,
        changes: Vec<Change>,
    ) -> BoxFuture<'static, Result<(), DocumentedError>> {
        let inner = &self.inner;
        if inner.kind.buffers_edits() {
            for change in changes {
                results.push(inner.ops.edit_config_running(
                    change.edit,
                    change.default_operation,
                    inner.rollback_on_error,
                ));
            }
            self.unlock();
        } else {
            results.push(inner.ops.commit());
        }

        results_to_tx_status(self.device().clone(), results).boxed()
    }

    fn on_commit_outcome(&self, outcome: &Result<(), CommitFailed>) {
        let buffered = self.inner.kind.buffers_edits();
        match outcome {
            Ok(()) => {
                Debug::TxCommitSuccess(self.device(), self.id()).log();
                if !buffered {
                    self.unlock();
                }
                self.notify(|listener| listener.on_transaction_successful(self));
            }
            Err(error) => {
                error.log();
                if !buffered {
                    self.cleanup();
                }
                self.notify(|listener| listener.on_transaction_failed(self, error));
            }
        }
    }

    // Discards the candidate changes and releases the locks, without waiting
    // for the replies.
    fn cleanup(&self) {
        let inner = &self.inner;
        if inner.kind.edit_target() == Datastore::Candidate {
            let discard = inner.ops.discard_changes();
            Task::background(async move {
                let _ = discard.await;
            });
        }
        self.unlock();
    }

    fn unlock(&self) {
        let inner = &self.inner;
        if !inner.lock_allowed {
            return;
        }

        let unlocks = inner
            .kind
            .unlock_order()
            .iter()
            .map(|datastore| inner.ops.unlock(*datastore))
            .collect::<Vec<_>>();
        Task::background(async move {
            let _ = future::join_all(unlocks).await;
        });
    }

    // Invokes a callback on every live listener. The state lock is released
    // before any callback runs.
    fn notify(&self, f: impl Fn(&dyn TxListener)) {
        let listeners = {
            let state = self.inner.state.lock().unwrap();
            state
                .listeners
                .iter()
                .filter_map(|(_, listener)| listener.upgrade())
                .collect::<Vec<_>>()
        };
        for listener in listeners {
            f(listener.as_ref());
        }
    }
}

impl std::fmt::Debug for WriteTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteTx")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("device", self.device())
            .finish()
    }
}

impl PartialEq for WriteTx {
    fn eq(&self, other: &WriteTx) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for WriteTx {}

// ===== impl ListenerRegistration =====

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.upgrade() {
            let mut state = tx.state.lock().unwrap();
            state.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

// ===== helper functions =====

// Top-level mixin nodes (e.g. a top-level list without entries) have no
// representation on the wire, and some devices reject an empty edit-config.
// Mixins nested deeper are always wrapped in a visible node.
fn contains_only_non_visible_data(path: &InstancePath, data: &DataNode) -> bool {
    path.len() == 1 && data.is_mixin()
}
