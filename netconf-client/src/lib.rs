//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod api;
pub mod broker;
pub mod capabilities;
pub mod config;
pub mod debug;
pub mod device;
pub mod error;
pub mod ops;
pub mod rpc;
pub mod service;
pub mod session;
pub mod transaction;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use crate::broker::DataBroker;
pub use crate::capabilities::Capabilities;
pub use crate::config::DeviceConfig;
pub use crate::error::{CommitFailed, DocumentedError, Error, TransportError};
pub use crate::ops::NetconfBaseOps;
pub use crate::rpc::{DomRpcResult, NetconfRpc, RpcService};
pub use crate::transaction::chain::{TxChain, TxChainListener};
pub use crate::transaction::{TxId, TxListener};

/// Identity of a mounted NETCONF device.
///
/// Only used to give context to logs and error messages.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RemoteDeviceId {
    name: Arc<str>,
}

// ===== impl RemoteDeviceId =====

impl RemoteDeviceId {
    pub fn new(name: &str) -> RemoteDeviceId {
        RemoteDeviceId { name: name.into() }
    }
}

impl std::fmt::Display for RemoteDeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RemoteDevice{{{}}}", self.name)
    }
}
