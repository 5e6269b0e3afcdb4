//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use crate::RemoteDeviceId;
use crate::capabilities::Capabilities;
use crate::config::DeviceConfig;
use crate::error::Error;
use crate::ops::NetconfBaseOps;
use crate::rpc::RpcService;
use crate::transaction::chain::{TxChain, TxChainListener};
use crate::transaction::read::ReadOnlyTx;
use crate::transaction::read_write::ReadWriteTx;
use crate::transaction::write::{WriteTx, WriteTxKind};

/// Transaction factory of a mounted device.
#[derive(Clone, Debug)]
pub struct DataBroker {
    ops: NetconfBaseOps,
    kind: WriteTxKind,
    rollback_on_error: bool,
    lock_allowed: bool,
}

// ===== impl DataBroker =====

impl DataBroker {
    /// Creates the broker of a device with the given capabilities.
    ///
    /// Fails if the device can't be written at all, i.e. it supports neither
    /// the candidate datastore nor a writable running datastore.
    pub fn new(
        device: RemoteDeviceId,
        rpc: Arc<dyn RpcService>,
        capabilities: Capabilities,
        config: &DeviceConfig,
    ) -> Result<DataBroker, Error> {
        let kind = WriteTxKind::select(capabilities, config.create_on_put)
            .ok_or_else(|| Error::UnsupportedCapabilities(device.clone()))?;
        let rollback_on_error = config.rollback_on_error
            && capabilities.contains(Capabilities::ROLLBACK_ON_ERROR);

        Ok(DataBroker {
            ops: NetconfBaseOps::new(device, rpc),
            kind,
            rollback_on_error,
            lock_allowed: config.lock_datastore,
        })
    }

    pub fn kind(&self) -> WriteTxKind {
        self.kind
    }

    pub fn ops(&self) -> &NetconfBaseOps {
        &self.ops
    }

    pub fn new_read_only_transaction(&self) -> ReadOnlyTx {
        ReadOnlyTx::new(self.ops.clone())
    }

    pub fn new_write_only_transaction(&self) -> WriteTx {
        WriteTx::new(
            self.kind,
            self.ops.clone(),
            self.rollback_on_error,
            self.lock_allowed,
        )
    }

    pub fn new_read_write_transaction(&self) -> ReadWriteTx {
        ReadWriteTx::new(
            self.new_read_only_transaction(),
            self.new_write_only_transaction(),
        )
    }

    pub fn create_transaction_chain(
        &self,
        listener: Arc<dyn TxChainListener>,
    ) -> TxChain {
        TxChain::new(self.clone(), listener)
    }
}
