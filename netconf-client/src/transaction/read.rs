//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use futures::FutureExt;
use futures::future::BoxFuture;
use netconf_yang::{InstancePath, LogicalDatastoreType};

use crate::error::Error;
use crate::ops::{NetconfBaseOps, ReadFuture};

/// Stateless read transaction.
///
/// Configuration reads are served from the running datastore, operational
/// reads with a `get` RPC.
#[derive(Clone, Debug)]
pub struct ReadOnlyTx {
    ops: NetconfBaseOps,
}

// ===== impl ReadOnlyTx =====

impl ReadOnlyTx {
    pub fn new(ops: NetconfBaseOps) -> ReadOnlyTx {
        ReadOnlyTx { ops }
    }

    pub fn read(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> ReadFuture {
        match store {
            LogicalDatastoreType::Configuration => {
                self.ops.get_config_running_data(path)
            }
            LogicalDatastoreType::Operational => self.ops.get_data(path),
        }
    }

    // Reads only the given fields, relative to `path`, of the selected node.
    pub fn read_fields(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
        fields: Vec<InstancePath>,
    ) -> ReadFuture {
        match store {
            LogicalDatastoreType::Configuration => {
                self.ops.get_config_running_data_fields(path, fields)
            }
            LogicalDatastoreType::Operational => {
                self.ops.get_data_fields(path, fields)
            }
        }
    }

    pub fn read_xpath(
        &self,
        store: LogicalDatastoreType,
        xpath: &str,
    ) -> ReadFuture {
        match store {
            LogicalDatastoreType::Configuration => {
                self.ops.get_config_running_xpath(xpath)
            }
            LogicalDatastoreType::Operational => self.ops.get_data_xpath(xpath),
        }
    }

    pub fn exists(
        &self,
        store: LogicalDatastoreType,
        path: &InstancePath,
    ) -> BoxFuture<'static, Result<bool, Error>> {
        self.read(store, path)
            .map(|result| result.map(|data| data.is_some()))
            .boxed()
    }
}
