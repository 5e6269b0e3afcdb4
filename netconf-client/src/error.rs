//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use itertools::Itertools;
use netconf_yang::{
    ErrorSeverity, ErrorTag, ErrorType, LogicalDatastoreType, RpcError,
};
use tracing::warn;

use crate::RemoteDeviceId;
use crate::transaction::TxId;

// NETCONF client errors.
//
// All of these are usage errors reported synchronously, except for
// `ReadFailed` which is how read futures fail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    TransactionFinished(TxId),
    InvalidStore(LogicalDatastoreType),
    ChainClosed,
    ChainFailed,
    TransactionPending(TxId),
    UnsupportedCapabilities(RemoteDeviceId),
    EmptyFields,
    ReadFailed(DocumentedError),
}

// Failure of the session carrying the RPCs. These are raised instead of an
// RPC reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransportError {
    SessionClosed,
    ReplyDropped,
    Disconnected(String),
}

/// Error with an explicit NETCONF classification.
///
/// `errors` keeps the RPC errors the classification was derived from, if
/// any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DocumentedError {
    pub message: String,
    pub error_type: ErrorType,
    pub tag: ErrorTag,
    pub severity: ErrorSeverity,
    pub errors: Vec<RpcError>,
}

// Outcome of a failed transaction commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitFailed {
    pub tx: TxId,
    pub cause: DocumentedError,
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::TransactionFinished(tx) | Error::TransactionPending(tx) => {
                warn!(%tx, "{}", self);
            }
            Error::InvalidStore(store) => {
                warn!(%store, "{}", self);
            }
            Error::UnsupportedCapabilities(device) => {
                warn!(%device, "{}", self);
            }
            Error::ReadFailed(error) => {
                warn!(%error, "{}", self);
            }
            Error::ChainClosed | Error::ChainFailed | Error::EmptyFields => {
                warn!("{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TransactionFinished(tx) => {
                write!(f, "transaction {tx} already finished")
            }
            Error::InvalidStore(store) => {
                write!(f, "can edit only configuration data, not {store}")
            }
            Error::ChainClosed => {
                write!(f, "transaction chain already closed")
            }
            Error::ChainFailed => {
                write!(f, "transaction chain failed")
            }
            Error::TransactionPending(tx) => {
                write!(
                    f,
                    "previous transaction {tx} not submitted or cancelled yet"
                )
            }
            Error::UnsupportedCapabilities(device) => {
                write!(
                    f,
                    "device {device} supports neither candidate nor writable-running"
                )
            }
            Error::EmptyFields => {
                write!(f, "field filter must contain at least one field")
            }
            Error::ReadFailed(..) => {
                write!(f, "read operation failed")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ReadFailed(error) => Some(error),
            _ => None,
        }
    }
}

// ===== impl TransportError =====

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::SessionClosed => {
                write!(f, "NETCONF session closed")
            }
            TransportError::ReplyDropped => {
                write!(f, "RPC reply dropped")
            }
            TransportError::Disconnected(reason) => {
                write!(f, "device disconnected: {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

// ===== impl DocumentedError =====

impl DocumentedError {
    pub fn new(
        message: impl Into<String>,
        error_type: ErrorType,
        tag: ErrorTag,
        severity: ErrorSeverity,
    ) -> DocumentedError {
        DocumentedError {
            message: message.into(),
            error_type,
            tag,
            severity,
            errors: Vec::new(),
        }
    }

    // Classifies a set of RPC errors after the first one.
    pub fn from_rpc_errors(
        prefix: impl std::fmt::Display,
        errors: Vec<RpcError>,
    ) -> DocumentedError {
        let (error_type, tag, severity) = errors
            .first()
            .map(|error| (error.error_type, error.tag, error.severity))
            .unwrap_or((
                ErrorType::Application,
                ErrorTag::OperationFailed,
                ErrorSeverity::Error,
            ));
        let messages = errors.iter().map(|error| &error.message).join("; ");
        DocumentedError {
            message: format!("{prefix}: {messages}"),
            error_type,
            tag,
            severity,
            errors,
        }
    }

    pub fn with_errors(mut self, errors: Vec<RpcError>) -> DocumentedError {
        self.errors = errors;
        self
    }
}

impl std::fmt::Display for DocumentedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} {} {})",
            self.message, self.error_type, self.tag, self.severity
        )
    }
}

impl std::error::Error for DocumentedError {}

// ===== impl CommitFailed =====

impl CommitFailed {
    pub fn error_type(&self) -> ErrorType {
        self.cause.error_type
    }

    pub fn error_tag(&self) -> ErrorTag {
        self.cause.tag
    }

    pub fn log(&self) {
        warn!(
            tx = %self.tx,
            error_type = %self.cause.error_type,
            tag = %self.cause.tag,
            message = %self.cause.message,
            "{}", self
        );
    }
}

impl std::fmt::Display for CommitFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commit of transaction {} failed", self.tx)
    }
}

impl std::error::Error for CommitFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
