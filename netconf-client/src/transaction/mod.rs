//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod chain;
pub mod read;
pub mod read_write;
pub mod status;
pub mod write;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::CommitFailed;
use crate::transaction::write::WriteTx;

static NEXT_TX_ID: AtomicU64 = AtomicU64::new(1);

// Transaction identifier, unique within the process.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct TxId(u64);

/// Observer of the lifecycle of a write transaction.
///
/// Callbacks are invoked without any transaction lock held, so they may call
/// back into the transaction.
pub trait TxListener: Send + Sync {
    fn on_transaction_cancelled(&self, tx: &WriteTx);

    fn on_transaction_submitted(&self, tx: &WriteTx);

    fn on_transaction_successful(&self, tx: &WriteTx);

    fn on_transaction_failed(&self, tx: &WriteTx, cause: &CommitFailed);
}

// ===== impl TxId =====

impl TxId {
    pub(crate) fn next() -> TxId {
        TxId(NEXT_TX_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx-{}", self.0)
    }
}
