//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use netconf_utils::task::Task;
use netconf_utils::{UnboundedReceiver, UnboundedSender};
use netconf_yang::{
    DataTree, EffectiveOperation, ErrorTag, ErrorType, InstancePath,
    RpcError,
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, debug_span};

use crate::api::{CloseRequest, Request, RpcRequest, SessionId};
use crate::capabilities::Capabilities;
use crate::debug::Debug;
use crate::error::TransportError;
use crate::rpc::{
    Datastore, DomRpcResult, EditStructure, Filter, NetconfRpc, RpcService,
};
use crate::session::SessionClient;

type RpcResult<T> = Result<T, RpcError>;

/// In-memory NETCONF server.
///
/// Owns the configuration datastores of a device and serves the requests of
/// any number of sessions, one at a time.
#[derive(Debug)]
pub struct LocalDevice {
    name: String,
    capabilities: Capabilities,
    running: DataTree,
    candidate: Option<DataTree>,
    startup: DataTree,
    locks: HashMap<Datastore, SessionId>,
    request_rx: UnboundedReceiver<Request>,
}

/// Handle of a running [`LocalDevice`]. The device stops once the handle
/// is dropped.
#[derive(Debug)]
pub struct LocalDeviceHandle {
    request_tx: UnboundedSender<Request>,
    next_session_id: Arc<AtomicU32>,
    _task: Task<()>,
}

// ===== impl LocalDevice =====

impl LocalDevice {
    /// Starts a device holding the given running configuration.
    ///
    /// The candidate datastore only exists when the `:candidate` capability
    /// is advertised.
    pub fn spawn(
        name: &str,
        capabilities: Capabilities,
        running: DataTree,
    ) -> LocalDeviceHandle {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let candidate = capabilities
            .contains(Capabilities::CANDIDATE)
            .then(|| running.clone());
        let device = LocalDevice {
            name: name.to_owned(),
            capabilities,
            startup: running.clone(),
            running,
            candidate,
            locks: Default::default(),
            request_rx,
        };

        let span = debug_span!("device", name = %name);
        let task = Task::spawn(device.run().instrument(span));
        LocalDeviceHandle {
            request_tx,
            next_session_id: Arc::new(AtomicU32::new(1)),
            _task: task,
        }
    }

    // Main event loop.
    async fn run(mut self) {
        debug!(capabilities = ?self.capabilities.names(), "device started");

        while let Some(request) = self.request_rx.recv().await {
            match request {
                Request::Rpc(request) => self.process_rpc_request(request),
                Request::Close(request) => self.process_close(request),
            }
        }
    }

    fn process_rpc_request(&mut self, request: RpcRequest) {
        Debug::DeviceRpcRx(&self.name, request.session_id, &request.rpc)
            .log();

        let reply = match self.process_rpc(request.session_id, request.rpc) {
            Ok(reply) => reply,
            Err(error) => DomRpcResult::with_errors(vec![error]),
        };
        let _ = request.responder.send(reply);
    }

    fn process_close(&mut self, request: CloseRequest) {
        Debug::DeviceSessionClose(&self.name, request.session_id).log();
        self.locks
            .retain(|_, session_id| *session_id != request.session_id);
    }

    fn process_rpc(
        &mut self,
        session_id: SessionId,
        rpc: NetconfRpc,
    ) -> RpcResult<DomRpcResult> {
        match rpc {
            NetconfRpc::Lock(datastore) => {
                self.datastore(datastore)?;
                if let Some(owner) = self.locks.get(&datastore) {
                    return Err(RpcError::new(
                        ErrorType::Protocol,
                        ErrorTag::LockDenied,
                        format!("{datastore} datastore already locked"),
                    )
                    .with_info(format!("session-id {owner}")));
                }
                self.locks.insert(datastore, session_id);
            }
            NetconfRpc::Unlock(datastore) => {
                self.datastore(datastore)?;
                if self.locks.get(&datastore) != Some(&session_id) {
                    return Err(RpcError::new(
                        ErrorType::Protocol,
                        ErrorTag::OperationFailed,
                        format!("{datastore} datastore not locked by this session"),
                    ));
                }
                self.locks.remove(&datastore);
            }
            NetconfRpc::DiscardChanges => {
                self.check_access(session_id, Datastore::Candidate)?;
                let running = self.running.clone();
                *self.candidate_mut()? = running;
            }
            NetconfRpc::Commit => {
                self.check_access(session_id, Datastore::Running)?;
                self.running = self.candidate_mut()?.clone();
            }
            NetconfRpc::Validate(datastore) => {
                if !self.capabilities.contains(Capabilities::VALIDATE) {
                    return Err(not_supported("validate"));
                }
                self.datastore(datastore)?;
            }
            NetconfRpc::CopyConfig { target, source } => {
                self.check_writable(target)?;
                self.check_access(session_id, target)?;
                let data = self.datastore(source)?.clone();
                *self.datastore_mut(target)? = data;
            }
            NetconfRpc::EditConfig {
                target,
                default_operation,
                rollback_on_error,
                edit,
            } => {
                self.check_writable(target)?;
                if rollback_on_error
                    && !self.capabilities.contains(Capabilities::ROLLBACK_ON_ERROR)
                {
                    return Err(not_supported("rollback-on-error"));
                }
                self.check_access(session_id, target)?;
                let tree = self.datastore_mut(target)?;
                edit_config(tree, edit, default_operation, rollback_on_error)?;
            }
            NetconfRpc::GetConfig { source, filter } => {
                let tree = self.datastore(source)?;
                return filter_data(tree, filter.as_ref());
            }
            NetconfRpc::Get { filter } => {
                return filter_data(&self.running, filter.as_ref());
            }
        }

        Ok(DomRpcResult::success())
    }

    fn datastore(&self, datastore: Datastore) -> RpcResult<&DataTree> {
        match datastore {
            Datastore::Running => Ok(&self.running),
            Datastore::Startup => Ok(&self.startup),
            Datastore::Candidate => self
                .candidate
                .as_ref()
                .ok_or_else(|| not_supported("candidate datastore")),
        }
    }

    fn datastore_mut(&mut self, datastore: Datastore) -> RpcResult<&mut DataTree> {
        match datastore {
            Datastore::Running => Ok(&mut self.running),
            Datastore::Startup => Ok(&mut self.startup),
            Datastore::Candidate => self.candidate_mut(),
        }
    }

    fn candidate_mut(&mut self) -> RpcResult<&mut DataTree> {
        self.candidate
            .as_mut()
            .ok_or_else(|| not_supported("candidate datastore"))
    }

    fn check_writable(&self, datastore: Datastore) -> RpcResult<()> {
        match datastore {
            Datastore::Running
                if !self.capabilities.contains(Capabilities::WRITABLE_RUNNING) =>
            {
                Err(not_supported("writable-running"))
            }
            Datastore::Candidate
                if !self.capabilities.contains(Capabilities::CANDIDATE) =>
            {
                Err(not_supported("candidate datastore"))
            }
            _ => Ok(()),
        }
    }

    // Fails if the datastore is locked by another session.
    fn check_access(
        &self,
        session_id: SessionId,
        datastore: Datastore,
    ) -> RpcResult<()> {
        match self.locks.get(&datastore) {
            Some(owner) if *owner != session_id => Err(RpcError::new(
                ErrorType::Protocol,
                ErrorTag::InUse,
                format!("{datastore} datastore locked by another session"),
            )
            .with_info(format!("session-id {owner}"))),
            _ => Ok(()),
        }
    }
}

// ===== impl LocalDeviceHandle =====

impl LocalDeviceHandle {
    // Opens a new session to the device.
    pub fn connect(&self) -> SessionClient {
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        SessionClient::new(session_id, self.request_tx.clone())
    }

    // Fetches the full contents of a datastore over a short-lived session.
    pub async fn get_config(
        &self,
        datastore: Datastore,
    ) -> Result<DataTree, TransportError> {
        let session = self.connect();
        let reply = session
            .invoke(NetconfRpc::GetConfig {
                source: datastore,
                filter: None,
            })
            .await;
        session.close();

        Ok(reply?.data.map(DataTree::from).unwrap_or_default())
    }
}

// ===== helper functions =====

fn not_supported(what: &str) -> RpcError {
    RpcError::new(
        ErrorType::Protocol,
        ErrorTag::OperationNotSupported,
        format!("{what} not supported"),
    )
}

// Applies a single edit-config payload. With rollback-on-error the edit is
// applied to a copy so that a failure leaves the datastore untouched.
fn edit_config(
    tree: &mut DataTree,
    edit: EditStructure,
    default_operation: Option<EffectiveOperation>,
    rollback_on_error: bool,
) -> RpcResult<()> {
    let operation = edit
        .operation
        .or(default_operation)
        .unwrap_or(EffectiveOperation::Merge);

    if rollback_on_error {
        let mut scratch = tree.clone();
        scratch.apply(&edit.path, edit.data, operation)?;
        *tree = scratch;
        Ok(())
    } else {
        tree.apply(&edit.path, edit.data, operation)
    }
}

fn filter_data(
    tree: &DataTree,
    filter: Option<&Filter>,
) -> RpcResult<DomRpcResult> {
    let selected = match filter {
        None => tree.clone(),
        Some(Filter::Subtree { path, fields }) => tree.subtree(path, fields),
        Some(Filter::XPath(xpath)) => {
            // Only plain instance paths are understood.
            let path = xpath.parse::<InstancePath>().map_err(|error| {
                RpcError::new(
                    ErrorType::Application,
                    ErrorTag::InvalidValue,
                    error.to_string(),
                )
            })?;
            tree.subtree(&path, &[])
        }
    };

    Ok(DomRpcResult::with_data(selected.to_data_node()))
}
