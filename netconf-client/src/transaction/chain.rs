//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::broker::DataBroker;
use crate::debug::Debug;
use crate::error::{CommitFailed, Error};
use crate::transaction::read::ReadOnlyTx;
use crate::transaction::read_write::ReadWriteTx;
use crate::transaction::write::{ListenerRegistration, WriteTx};
use crate::transaction::{TxId, TxListener};

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct ChainId(u64);

// Observer of the outcome of a transaction chain.
pub trait TxChainListener: Send + Sync {
    // All transactions succeeded and the chain was closed.
    fn on_transaction_chain_successful(&self, chain: ChainId);

    // A transaction of the chain failed. Called at most once per chain.
    fn on_transaction_chain_failed(
        &self,
        chain: ChainId,
        tx: TxId,
        cause: &CommitFailed,
    );
}

/// Sequence of write transactions against one device.
///
/// At most one write transaction may be open (created but neither submitted
/// nor cancelled) at a time. The failure of any transaction fails the whole
/// chain: the open transaction is cancelled and no further write
/// transactions can be created.
#[derive(Clone)]
pub struct TxChain {
    inner: Arc<ChainInner>,
}

struct ChainInner {
    id: ChainId,
    broker: DataBroker,
    listener: Arc<dyn TxChainListener>,
    state: Mutex<ChainState>,
}

#[derive(Default)]
struct ChainState {
    // Transactions whose outcome isn't known yet.
    pending: HashMap<TxId, ListenerRegistration>,
    // Open transaction, if any.
    current: Option<WriteTx>,
    closed: bool,
    failed: bool,
    success_notified: bool,
}

// ===== impl ChainId =====

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chain-{}", self.0)
    }
}

// ===== impl TxChain =====

impl TxChain {
    pub(crate) fn new(
        broker: DataBroker,
        listener: Arc<dyn TxChainListener>,
    ) -> TxChain {
        let id = ChainId(NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed));
        TxChain {
            inner: Arc::new(ChainInner {
                id,
                broker,
                listener,
                state: Default::default(),
            }),
        }
    }

    pub fn id(&self) -> ChainId {
        self.inner.id
    }

    pub fn new_read_only_transaction(&self) -> Result<ReadOnlyTx, Error> {
        let state = self.inner.state.lock().unwrap();
        if state.closed {
            return Err(Error::ChainClosed);
        }
        Ok(self.inner.broker.new_read_only_transaction())
    }

    pub fn new_write_only_transaction(&self) -> Result<WriteTx, Error> {
        let mut state = self.inner.state.lock().unwrap();
        state.check_operation_permitted()?;

        let tx = self.inner.broker.new_write_only_transaction();
        let inner: Arc<dyn TxListener> = self.inner.clone();
        let registration = tx.add_listener(Arc::downgrade(&inner));
        state.pending.insert(tx.id(), registration);
        state.current = Some(tx.clone());
        Debug::ChainTxCreate(self.inner.id, tx.id()).log();

        Ok(tx)
    }

    pub fn new_read_write_transaction(&self) -> Result<ReadWriteTx, Error> {
        let write = self.new_write_only_transaction()?;
        let read = self.inner.broker.new_read_only_transaction();
        Ok(ReadWriteTx::new(read, write))
    }

    // Closes the chain. Calling this more than once has no effect.
    pub fn close(&self) {
        let notify_success = {
            let mut state = self.inner.state.lock().unwrap();
            if state.closed {
                return;
            }
            state.closed = true;
            Debug::ChainClose(self.inner.id).log();
            state.check_success()
        };

        if notify_success {
            self.inner.notify_success();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().unwrap().closed
    }
}

impl std::fmt::Debug for TxChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxChain").field("id", &self.inner.id).finish()
    }
}

// ===== impl ChainInner =====

impl ChainInner {
    fn notify_success(&self) {
        Debug::ChainSuccess(self.id).log();
        self.listener.on_transaction_chain_successful(self.id);
    }
}

// Listener registrations are removed from the pending map under the chain
// lock, but dropped only once it is released.
impl TxListener for ChainInner {
    fn on_transaction_cancelled(&self, tx: &WriteTx) {
        let (registration, notify_success) = {
            let mut state = self.state.lock().unwrap();
            let registration = state.pending.remove(&tx.id());
            state.clear_current(tx);
            (registration, state.check_success())
        };
        drop(registration);

        if notify_success {
            self.notify_success();
        }
    }

    fn on_transaction_submitted(&self, tx: &WriteTx) {
        let mut state = self.state.lock().unwrap();
        state.clear_current(tx);
    }

    fn on_transaction_successful(&self, tx: &WriteTx) {
        let (registration, notify_success) = {
            let mut state = self.state.lock().unwrap();
            let registration = state.pending.remove(&tx.id());
            (registration, state.check_success())
        };
        drop(registration);

        if notify_success {
            self.notify_success();
        }
    }

    fn on_transaction_failed(&self, tx: &WriteTx, cause: &CommitFailed) {
        let (registration, current, first_failure) = {
            let mut state = self.state.lock().unwrap();
            let registration = state.pending.remove(&tx.id());
            let first_failure = !state.failed;
            state.failed = true;
            (registration, state.current.take(), first_failure)
        };
        drop(registration);

        // The open transaction reports its cancellation back to the chain.
        if let Some(current) = current {
            current.cancel();
        }

        if first_failure {
            self.listener
                .on_transaction_chain_failed(self.id, tx.id(), cause);
        }
    }
}

// ===== impl ChainState =====

impl ChainState {
    fn check_operation_permitted(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::ChainClosed);
        }
        if self.failed {
            return Err(Error::ChainFailed);
        }
        if let Some(current) = &self.current {
            return Err(Error::TransactionPending(current.id()));
        }
        Ok(())
    }

    fn clear_current(&mut self, tx: &WriteTx) {
        if self.current.as_ref().is_some_and(|current| current == tx) {
            self.current = None;
        }
    }

    // Returns whether the chain just became successful.
    fn check_success(&mut self) -> bool {
        if self.closed
            && self.pending.is_empty()
            && !self.failed
            && !self.success_notified
        {
            self.success_notified = true;
            return true;
        }
        false
    }
}
