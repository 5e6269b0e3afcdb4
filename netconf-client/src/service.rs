//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use futures::FutureExt;
use futures::future;
use netconf_yang::{
    DataNode, EffectiveOperation, InstancePath, LogicalDatastoreType,
};
use tracing::{debug, error, info, warn};

use crate::capabilities::Capabilities;
use crate::config::DeviceConfig;
use crate::error::Error;
use crate::ops::{NetconfBaseOps, ReadFuture};
use crate::rpc::{Datastore, DomRpcResult, RpcFuture};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataTreeServiceKind {
    Candidate,
    Running,
    CandidateWithRunning,
}

/// Explicit access to the datastores of a device.
///
/// Unlike write transactions, the caller drives every step: locking, edits,
/// commit and unlocking. Each step returns the reply of the underlying RPCs.
#[derive(Clone, Debug)]
pub struct DataTreeService {
    kind: DataTreeServiceKind,
    ops: NetconfBaseOps,
    rollback_on_error: bool,
    lock_allowed: bool,
}

// ===== impl DataTreeServiceKind =====

impl DataTreeServiceKind {
    pub fn select(capabilities: Capabilities) -> Option<DataTreeServiceKind> {
        let candidate = capabilities.contains(Capabilities::CANDIDATE);
        let running = capabilities.contains(Capabilities::WRITABLE_RUNNING);
        match (candidate, running) {
            (true, true) => Some(DataTreeServiceKind::CandidateWithRunning),
            (true, false) => Some(DataTreeServiceKind::Candidate),
            (false, true) => Some(DataTreeServiceKind::Running),
            (false, false) => None,
        }
    }

    fn lock_order(&self) -> &'static [Datastore] {
        match self {
            DataTreeServiceKind::Candidate => &[Datastore::Candidate],
            DataTreeServiceKind::Running => &[Datastore::Running],
            DataTreeServiceKind::CandidateWithRunning => {
                &[Datastore::Candidate, Datastore::Running]
            }
        }
    }

    fn unlock_order(&self) -> &'static [Datastore] {
        match self {
            DataTreeServiceKind::Candidate => &[Datastore::Candidate],
            DataTreeServiceKind::Running => &[Datastore::Running],
            DataTreeServiceKind::CandidateWithRunning => {
                &[Datastore::Running, Datastore::Candidate]
            }
        }
    }

    fn edit_target(&self) -> Datastore {
        match self {
            DataTreeServiceKind::Running => Datastore::Running,
            _ => Datastore::Candidate,
        }
    }
}

// ===== impl DataTreeService =====

impl DataTreeService {
    pub fn new(
        ops: NetconfBaseOps,
        capabilities: Capabilities,
        config: &DeviceConfig,
    ) -> Result<DataTreeService, Error> {
        let kind = DataTreeServiceKind::select(capabilities).ok_or_else(|| {
            Error::UnsupportedCapabilities(ops.device().clone())
        })?;
        let rollback_on_error = config.rollback_on_error
            && capabilities.contains(Capabilities::ROLLBACK_ON_ERROR);

        Ok(DataTreeService {
            kind,
            ops,
            rollback_on_error,
            lock_allowed: config.lock_datastore,
        })
    }

    pub fn kind(&self) -> DataTreeServiceKind {
        self.kind
    }

    // Locks the datastores the service edits.
    pub fn lock(&self) -> RpcFuture {
        if !self.lock_allowed {
            debug!(device = %self.ops.device(), "lock not allowed by device configuration, ignoring");
            return rpc_success();
        }

        let locks = self
            .kind
            .lock_order()
            .iter()
            .map(|datastore| self.ops.lock(*datastore))
            .collect();
        let device = self.ops.device().clone();
        merge_results(locks)
            .inspect(move |result| match result {
                Ok(reply) if reply.is_success() => {
                    debug!(%device, "lock successful");
                }
                Ok(reply) if reply.all_warnings() => {
                    info!(%device, errors = ?reply.errors, "lock successful with warnings");
                }
                Ok(reply) => {
                    warn!(%device, errors = ?reply.errors, "lock failed");
                }
                Err(error) => {
                    warn!(%device, %error, "lock failed");
                }
            })
            .boxed()
    }

    pub fn unlock(&self) -> RpcFuture {
        if !self.lock_allowed {
            debug!(device = %self.ops.device(), "unlock not allowed by device configuration, ignoring");
            return rpc_success();
        }

        let unlocks = self
            .kind
            .unlock_order()
            .iter()
            .map(|datastore| self.ops.unlock(*datastore))
            .collect();
        let device = self.ops.device().clone();
        merge_results(unlocks)
            .inspect(move |result| match result {
                Ok(reply) if reply.is_success() => {
                    debug!(%device, "unlock successful");
                }
                Ok(reply) if reply.all_warnings() => {
                    info!(%device, errors = ?reply.errors, "unlock successful with warnings");
                }
                Ok(reply) => {
                    error!(%device, errors = ?reply.errors, "unlock failed");
                }
                Err(error) => {
                    error!(%device, %error, "unlock failed");
                }
            })
            .boxed()
    }

    pub fn discard_changes(&self) -> RpcFuture {
        match self.kind {
            // Changes can't be discarded from running.
            DataTreeServiceKind::Running => rpc_success(),
            _ => self.ops.discard_changes(),
        }
    }

    pub fn commit(&self) -> RpcFuture {
        match self.kind {
            // Without a candidate, edits take effect immediately.
            DataTreeServiceKind::Running => rpc_success(),
            _ => self.ops.commit(),
        }
    }

    pub fn get(&self, path: &InstancePath) -> ReadFuture {
        self.ops.get_data(path)
    }

    pub fn get_fields(
        &self,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        self.ops.get_data_fields(path, fields)
    }

    pub fn get_config(&self, path: &InstancePath) -> ReadFuture {
        self.ops.get_config_running_data(path)
    }

    pub fn get_config_fields(
        &self,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        self.ops.get_config_running_data_fields(path, fields)
    }

    pub fn merge(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
        default_operation: Option<EffectiveOperation>,
    ) -> Result<RpcFuture, Error> {
        check_editable(store)?;
        Ok(self.edit(
            path,
            Some(data),
            EffectiveOperation::Merge,
            default_operation,
        ))
    }

    pub fn replace(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
        default_operation: Option<EffectiveOperation>,
    ) -> Result<RpcFuture, Error> {
        check_editable(store)?;
        Ok(self.edit(
            path,
            Some(data),
            EffectiveOperation::Replace,
            default_operation,
        ))
    }

    pub fn create(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
        default_operation: Option<EffectiveOperation>,
    ) -> Result<RpcFuture, Error> {
        check_editable(store)?;
        Ok(self.edit(
            path,
            Some(data),
            EffectiveOperation::Create,
            default_operation,
        ))
    }

    pub fn delete(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> Result<RpcFuture, Error> {
        check_editable(store)?;
        Ok(self.edit(path, None, EffectiveOperation::Delete, None))
    }

    pub fn remove(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> Result<RpcFuture, Error> {
        check_editable(store)?;
        Ok(self.edit(path, None, EffectiveOperation::Remove, None))
    }

    fn edit(
        &self,
        path: &InstancePath,
        data: Option<DataNode>,
        operation: EffectiveOperation,
        default_operation: Option<EffectiveOperation>,
    ) -> RpcFuture {
        let edit =
            self.ops
                .create_edit_config_structure(data, Some(operation), path);
        self.ops.edit_config(
            self.kind.edit_target(),
            edit,
            default_operation,
            self.rollback_on_error,
        )
    }
}

// ===== helper functions =====

fn check_editable(store: LogicalDatastoreType) -> Result<(), Error> {
    if store != LogicalDatastoreType::Configuration {
        return Err(Error::InvalidStore(store));
    }
    Ok(())
}

fn rpc_success() -> RpcFuture {
    future::ready(Ok(DomRpcResult::success())).boxed()
}

// Merges the replies of several RPCs into one holding all of their errors.
fn merge_results(mut results: Vec<RpcFuture>) -> RpcFuture {
    if results.len() == 1
        && let Some(result) = results.pop()
    {
        return result;
    }

    async move {
        let mut merged = DomRpcResult::success();
        for reply in future::join_all(results).await {
            merged.errors.extend(reply?.errors);
        }
        Ok(merged)
    }
    .boxed()
}
