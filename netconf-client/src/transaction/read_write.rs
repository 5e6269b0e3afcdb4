//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use derive_new::new;
use futures::future::BoxFuture;
use netconf_yang::{DataNode, InstancePath, LogicalDatastoreType};

use crate::error::Error;
use crate::ops::ReadFuture;
use crate::transaction::TxId;
use crate::transaction::read::ReadOnlyTx;
use crate::transaction::write::{CommitFuture, WriteTx};

// Read-write transaction: reads go straight to the device, writes follow
// the write transaction semantics. Reads don't observe uncommitted writes.
#[derive(Clone, Debug, new)]
pub struct ReadWriteTx {
    read: ReadOnlyTx,
    write: WriteTx,
}

// ===== impl ReadWriteTx =====

impl ReadWriteTx {
    pub fn id(&self) -> TxId {
        self.write.id()
    }

    pub fn write_tx(&self) -> &WriteTx {
        &self.write
    }

    pub fn read(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> ReadFuture {
        self.read.read(store, path)
    }

    pub fn read_fields(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        self.read.read_fields(store, path, fields)
    }

    pub fn exists(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> BoxFuture<'static, Result<bool, Error>> {
        self.read.exists(store, path)
    }

    pub fn put(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
    ) -> Result<(), Error> {
        self.write.put(store, path, data)
    }

    pub fn merge(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        data: DataNode,
    ) -> Result<(), Error> {
        self.write.merge(store, path, data)
    }

    pub fn delete(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> Result<(), Error> {
        self.write.delete(store, path)
    }

    pub fn cancel(&self) -> bool {
        self.write.cancel()
    }

    pub fn commit(&self) -> Result<CommitFuture, Error> {
        self.write.commit()
    }
}
