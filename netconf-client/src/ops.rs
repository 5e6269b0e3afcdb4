//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use derive_new::new;
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use netconf_yang::{
    DataNode, DataTree, EffectiveOperation, ErrorSeverity, ErrorTag,
    ErrorType, InstancePath,
};
use tracing::warn;

use crate::RemoteDeviceId;
use crate::debug::Debug;
use crate::error::{DocumentedError, Error, TransportError};
use crate::rpc::{
    Datastore, DomRpcResult, EditStructure, Filter, NetconfRpc, RpcFuture,
    RpcService,
};

// Future of a data read.
pub type ReadFuture = BoxFuture<'static, Result<Option<DataNode>, Error>>;

/// Base NETCONF operations issued against one device.
#[derive(Clone)]
pub struct NetconfBaseOps {
    device: RemoteDeviceId,
    rpc: Arc<dyn RpcService>,
}

// Logs the outcome of a single RPC on behalf of its caller.
#[derive(Debug, new)]
struct RpcCallback {
    operation: String,
    device: RemoteDeviceId,
}

// ===== impl NetconfBaseOps =====

impl NetconfBaseOps {
    pub fn new(
        device: RemoteDeviceId,
        rpc: Arc<dyn RpcService>,
    ) -> NetconfBaseOps {
        NetconfBaseOps { device, rpc }
    }

    pub fn device(&self) -> &RemoteDeviceId {
        &self.device
    }

    fn invoke(&self, rpc: NetconfRpc) -> RpcFuture {
        Debug::RpcSend(&self.device, &rpc).log();
        let callback = RpcCallback::new(rpc.to_string(), self.device.clone());
        callback.wrap(self.rpc.invoke(rpc))
    }

    pub fn lock(&self, datastore: Datastore) -> RpcFuture {
        self.invoke(NetconfRpc::Lock(datastore))
    }

    pub fn lock_candidate(&self) -> RpcFuture {
        self.lock(Datastore::Candidate)
    }

    pub fn lock_running(&self) -> RpcFuture {
        self.lock(Datastore::Running)
    }

    pub fn unlock(&self, datastore: Datastore) -> RpcFuture {
        self.invoke(NetconfRpc::Unlock(datastore))
    }

    pub fn unlock_candidate(&self) -> RpcFuture {
        self.unlock(Datastore::Candidate)
    }

    pub fn unlock_running(&self) -> RpcFuture {
        self.unlock(Datastore::Running)
    }

    pub fn discard_changes(&self) -> RpcFuture {
        self.invoke(NetconfRpc::DiscardChanges)
    }

    pub fn commit(&self) -> RpcFuture {
        self.invoke(NetconfRpc::Commit)
    }

    pub fn validate(&self, datastore: Datastore) -> RpcFuture {
        self.invoke(NetconfRpc::Validate(datastore))
    }

    pub fn validate_candidate(&self) -> RpcFuture {
        self.validate(Datastore::Candidate)
    }

    pub fn validate_running(&self) -> RpcFuture {
        self.validate(Datastore::Running)
    }

    pub fn copy_config(&self, source: Datastore, target: Datastore) -> RpcFuture {
        self.invoke(NetconfRpc::CopyConfig { target, source })
    }

    pub fn copy_running_to_candidate(&self) -> RpcFuture {
        self.copy_config(Datastore::Running, Datastore::Candidate)
    }

    pub fn edit_config(
        &self,
        target: Datastore,
        edit: EditStructure,
        default_operation: Option<EffectiveOperation>,
        rollback_on_error: bool,
    ) -> RpcFuture {
        self.invoke(NetconfRpc::EditConfig {
            target,
            default_operation,
            rollback_on_error,
            edit,
        })
    }

    pub fn edit_config_candidate(
        &self,
        edit: EditStructure,
        default_operation: Option<EffectiveOperation>,
        rollback_on_error: bool,
    ) -> RpcFuture {
        self.edit_config(
            Datastore::Candidate,
            edit,
            default_operation,
            rollback_on_error,
        )
    }

    pub fn edit_config_running(
        &self,
        edit: EditStructure,
        default_operation: Option<EffectiveOperation>,
        rollback_on_error: bool,
    ) -> RpcFuture {
        self.edit_config(
            Datastore::Running,
            edit,
            default_operation,
            rollback_on_error,
        )
    }

    // Builds the payload of an edit-config RPC.
    pub fn create_edit_config_structure(
        &self,
        data: Option<DataNode>,
        operation: Option<EffectiveOperation>,
        path: &InstancePath,
    ) -> EditStructure {
        EditStructure {
            path: path.clone(),
            data,
            operation,
        }
    }

    pub fn get_config(
        &self,
        source: Datastore,
        filter: Option<Filter>,
    ) -> RpcFuture {
        self.invoke(NetconfRpc::GetConfig { source, filter })
    }

    pub fn get(&self, filter: Option<Filter>) -> RpcFuture {
        self.invoke(NetconfRpc::Get { filter })
    }

    // Reads configuration data from the running datastore.
    pub fn get_config_running_data(&self, path: &InstancePath) -> ReadFuture {
        self.read_config(Datastore::Running, path, Vec::new())
    }

    pub fn get_config_running_data_fields(
        &self,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        if fields.is_empty() {
            return empty_fields();
        }
        self.read_config(Datastore::Running, path, fields)
    }

    pub fn get_config_candidate_data(&self, path: &InstancePath) -> ReadFuture {
        self.read_config(Datastore::Candidate, path, Vec::new())
    }

    // Reads configuration and state data.
    pub fn get_data(&self, path: &InstancePath) -> ReadFuture {
        self.read_state(path, Vec::new())
    }

    pub fn get_data_fields(
        &self,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        if fields.is_empty() {
            return empty_fields();
        }
        self.read_state(path, fields)
    }

    // Reads the running configuration selected by an XPath expression. The
    // whole reply is returned.
    pub fn get_config_running_xpath(&self, xpath: &str) -> ReadFuture {
        let filter = Filter::XPath(xpath.to_owned());
        let reply = self.get_config(Datastore::Running, Some(filter));
        self.read_reply(reply, None)
    }

    pub fn get_data_xpath(&self, xpath: &str) -> ReadFuture {
        let filter = Filter::XPath(xpath.to_owned());
        let reply = self.get(Some(filter));
        self.read_reply(reply, None)
    }

    fn read_config(
        &self,
        source: Datastore,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        let reply = self.get_config(source, Some(subtree_filter(path, fields)));
        self.read_reply(reply, Some(path.clone()))
    }

    fn read_state(
        &self,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        let reply = self.get(Some(subtree_filter(path, fields)));
        self.read_reply(reply, Some(path.clone()))
    }

    // Extracts the node at `path` from the data of a get/get-config reply.
    fn read_reply(
        &self,
        reply: RpcFuture,
        path: Option<InstancePath>,
    ) -> ReadFuture {
        let device = self.device.clone();
        async move {
            let reply = reply.await.map_err(|error| {
                Error::ReadFailed(DocumentedError::new(
                    format!("{device}: read failed: {error}"),
                    ErrorType::Application,
                    ErrorTag::OperationFailed,
                    ErrorSeverity::Error,
                ))
            })?;
            if !reply.is_success() {
                return Err(Error::ReadFailed(DocumentedError::from_rpc_errors(
                    format!("{device}: read failed"),
                    reply.errors,
                )));
            }

            let Some(data) = reply.data else {
                return Ok(None);
            };
            match path {
                Some(path) => Ok(DataTree::from(data).read(&path)),
                None => Ok(Some(data)),
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for NetconfBaseOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetconfBaseOps")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

// ===== impl RpcCallback =====

impl RpcCallback {
    fn wrap(self, future: RpcFuture) -> RpcFuture {
        async move {
            let result = future.await;
            self.on_result(&result);
            result
        }
        .boxed()
    }

    fn on_result(&self, result: &Result<DomRpcResult, TransportError>) {
        match result {
            Ok(reply) if reply.is_success() => {
                Debug::RpcSuccess(&self.device, &self.operation).log();
            }
            Ok(reply) => {
                warn!(
                    device = %self.device,
                    operation = %self.operation,
                    errors = ?reply.errors,
                    "RPC invoked unsuccessfully"
                );
            }
            Err(error) => {
                warn!(
                    device = %self.device,
                    operation = %self.operation,
                    %error,
                    "RPC failed"
                );
            }
        }
    }
}

// ===== helper functions =====

fn subtree_filter(path: &InstancePath, fields: Vec<InstancePath>) -> Filter {
    Filter::Subtree {
        path: path.clone(),
        fields,
    }
}

fn empty_fields() -> ReadFuture {
    future::ready(Err(Error::EmptyFields)).boxed()
}
