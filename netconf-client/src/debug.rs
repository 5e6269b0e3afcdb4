//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use netconf_yang::InstancePath;
use tracing::{debug, debug_span, trace, trace_span};

use crate::RemoteDeviceId;
use crate::api::SessionId;
use crate::rpc::NetconfRpc;
use crate::transaction::TxId;
use crate::transaction::chain::ChainId;
use crate::transaction::write::WriteTxKind;

// NETCONF client debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    TxCreate(&'a RemoteDeviceId, TxId, WriteTxKind),
    TxEdit(&'a RemoteDeviceId, TxId, &'a str, &'a InstancePath),
    TxEditIgnored(&'a RemoteDeviceId, TxId, &'a str, &'a InstancePath),
    TxSubmit(&'a RemoteDeviceId, TxId),
    TxCancel(&'a RemoteDeviceId, TxId),
    TxCommitSuccess(&'a RemoteDeviceId, TxId),
    ChainTxCreate(ChainId, TxId),
    ChainClose(ChainId),
    ChainSuccess(ChainId),
    RpcSend(&'a RemoteDeviceId, &'a NetconfRpc),
    RpcSuccess(&'a RemoteDeviceId, &'a str),
    DeviceRpcRx(&'a str, SessionId, &'a NetconfRpc),
    DeviceSessionClose(&'a str, SessionId),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub fn log(&self) {
        match self {
            Debug::TxCreate(device, tx, kind) => {
                debug_span!("netconf", %device).in_scope(|| {
                    debug!(%tx, ?kind, "{}", self);
                });
            }
            Debug::TxEdit(device, tx, edit, path)
            | Debug::TxEditIgnored(device, tx, edit, path) => {
                debug_span!("netconf", %device).in_scope(|| {
                    debug!(%tx, %edit, %path, "{}", self);
                });
            }
            Debug::TxSubmit(device, tx)
            | Debug::TxCancel(device, tx)
            | Debug::TxCommitSuccess(device, tx) => {
                debug_span!("netconf", %device).in_scope(|| {
                    debug!(%tx, "{}", self);
                });
            }
            Debug::ChainTxCreate(chain, tx) => {
                debug_span!("netconf").in_scope(|| {
                    debug!(%chain, %tx, "{}", self);
                });
            }
            Debug::ChainClose(chain) | Debug::ChainSuccess(chain) => {
                debug_span!("netconf").in_scope(|| {
                    debug!(%chain, "{}", self);
                });
            }
            Debug::RpcSend(device, rpc) => {
                trace_span!("netconf", %device).in_scope(|| {
                    trace!(%rpc, "{}", self);
                });
            }
            Debug::RpcSuccess(device, operation) => {
                trace_span!("netconf", %device).in_scope(|| {
                    trace!(%operation, "{}", self);
                });
            }
            Debug::DeviceRpcRx(device, session_id, rpc) => {
                trace_span!("device", %device).in_scope(|| {
                    trace!(%session_id, ?rpc, "{}", self);
                });
            }
            Debug::DeviceSessionClose(device, session_id) => {
                trace_span!("device", %device).in_scope(|| {
                    trace!(%session_id, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::TxCreate(..) => {
                write!(f, "write transaction created")
            }
            Debug::TxEdit(..) => {
                write!(f, "edit requested")
            }
            Debug::TxEditIgnored(..) => {
                write!(f, "ignoring edit, resulting data structure is empty")
            }
            Debug::TxSubmit(..) => {
                write!(f, "transaction submitted")
            }
            Debug::TxCancel(..) => {
                write!(f, "transaction cancelled")
            }
            Debug::TxCommitSuccess(..) => {
                write!(f, "write successful, unlocking")
            }
            Debug::ChainTxCreate(..) => {
                write!(f, "chain transaction created")
            }
            Debug::ChainClose(..) => {
                write!(f, "transaction chain closed")
            }
            Debug::ChainSuccess(..) => {
                write!(f, "transaction chain successful")
            }
            Debug::RpcSend(..) => {
                write!(f, "sending RPC")
            }
            Debug::RpcSuccess(..) => {
                write!(f, "RPC successful")
            }
            Debug::DeviceRpcRx(..) => {
                write!(f, "received RPC")
            }
            Debug::DeviceSessionClose(..) => {
                write!(f, "session closed")
            }
        }
    }
}
