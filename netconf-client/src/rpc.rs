//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use enum_as_inner::EnumAsInner;
use futures::future::BoxFuture;
use netconf_yang::{DataNode, EffectiveOperation, InstancePath, RpcError};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

// Future of a single RPC reply.
pub type RpcFuture = BoxFuture<'static, Result<DomRpcResult, TransportError>>;

// Configuration datastores (RFC 6241, section 5.1).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    Candidate,
    Running,
    Startup,
}

// Payload of an edit-config RPC. Without an explicit operation on the edited
// node the default operation of the request applies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditStructure {
    pub path: InstancePath,
    pub data: Option<DataNode>,
    pub operation: Option<EffectiveOperation>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter {
    Subtree {
        path: InstancePath,
        fields: Vec<InstancePath>,
    },
    XPath(String),
}

/// Base NETCONF operations.
#[derive(Clone, Debug, EnumAsInner, Eq, PartialEq)]
pub enum NetconfRpc {
    Lock(Datastore),
    Unlock(Datastore),
    DiscardChanges,
    Commit,
    Validate(Datastore),
    CopyConfig {
        target: Datastore,
        source: Datastore,
    },
    EditConfig {
        target: Datastore,
        default_operation: Option<EffectiveOperation>,
        rollback_on_error: bool,
        edit: EditStructure,
    },
    GetConfig {
        source: Datastore,
        filter: Option<Filter>,
    },
    Get {
        filter: Option<Filter>,
    },
}

// Reply to an RPC: output data and the errors reported by the device.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DomRpcResult {
    pub data: Option<DataNode>,
    pub errors: Vec<RpcError>,
}

/// Session to a NETCONF device.
pub trait RpcService: Send + Sync {
    /// Sends an RPC to the device.
    ///
    /// The request is issued before this method returns, so RPCs reach the
    /// device in invocation order whether or not the returned futures are
    /// ever polled.
    fn invoke(&self, rpc: NetconfRpc) -> RpcFuture;
}

// ===== impl Datastore =====

impl std::fmt::Display for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datastore::Candidate => write!(f, "candidate"),
            Datastore::Running => write!(f, "running"),
            Datastore::Startup => write!(f, "startup"),
        }
    }
}

// ===== impl NetconfRpc =====

impl NetconfRpc {
    pub fn name(&self) -> &'static str {
        match self {
            NetconfRpc::Lock(..) => "lock",
            NetconfRpc::Unlock(..) => "unlock",
            NetconfRpc::DiscardChanges => "discard-changes",
            NetconfRpc::Commit => "commit",
            NetconfRpc::Validate(..) => "validate",
            NetconfRpc::CopyConfig { .. } => "copy-config",
            NetconfRpc::EditConfig { .. } => "edit-config",
            NetconfRpc::GetConfig { .. } => "get-config",
            NetconfRpc::Get { .. } => "get",
        }
    }
}

impl std::fmt::Display for NetconfRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.name();
        match self {
            NetconfRpc::Lock(datastore)
            | NetconfRpc::Unlock(datastore)
            | NetconfRpc::Validate(datastore)
            | NetconfRpc::EditConfig {
                target: datastore, ..
            }
            | NetconfRpc::GetConfig {
                source: datastore, ..
            } => write!(f, "{name}({datastore})"),
            NetconfRpc::CopyConfig { target, source } => {
                write!(f, "{name}({source}->{target})")
            }
            NetconfRpc::DiscardChanges
            | NetconfRpc::Commit
            | NetconfRpc::Get { .. } => write!(f, "{name}"),
        }
    }
}

// ===== impl DomRpcResult =====

impl DomRpcResult {
    pub fn success() -> DomRpcResult {
        DomRpcResult::default()
    }

    pub fn with_data(data: DataNode) -> DomRpcResult {
        DomRpcResult {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(errors: Vec<RpcError>) -> DomRpcResult {
        DomRpcResult { data: None, errors }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    // Returns whether the reply carries errors but only with warning
    // severity.
    pub fn all_warnings(&self) -> bool {
        !self.errors.is_empty() && self.errors.iter().all(RpcError::is_warning)
    }
}
