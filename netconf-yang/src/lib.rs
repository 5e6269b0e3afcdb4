//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod common;
pub mod error;
pub mod node;
pub mod path;
pub mod tree;

pub use crate::common::{
    EffectiveOperation, ErrorSeverity, ErrorTag, ErrorType,
    LogicalDatastoreType, RpcError,
};
pub use crate::error::Error;
pub use crate::node::DataNode;
pub use crate::path::{InstancePath, PathArg};
pub use crate::tree::DataTree;
