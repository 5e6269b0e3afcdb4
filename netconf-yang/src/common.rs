//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

// Logical datastore addressed by a data operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalDatastoreType {
    Configuration,
    Operational,
}

// Per-node operation attached to an edit-config payload (RFC 6241, section
// 7.2).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveOperation {
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    None,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    PartialOperation,
    MalformedMessage,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Error,
    Warning,
}

// Structured error reported inside an <rpc-reply>.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RpcError {
    pub error_type: ErrorType,
    pub tag: ErrorTag,
    pub severity: ErrorSeverity,
    pub app_tag: Option<String>,
    pub message: String,
    pub info: Option<String>,
}

// ===== impl LogicalDatastoreType =====

impl std::fmt::Display for LogicalDatastoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalDatastoreType::Configuration => write!(f, "configuration"),
            LogicalDatastoreType::Operational => write!(f, "operational"),
        }
    }
}

// ===== impl EffectiveOperation =====

impl EffectiveOperation {
    pub fn xml_value(&self) -> &'static str {
        match self {
            EffectiveOperation::Merge => "merge",
            EffectiveOperation::Replace => "replace",
            EffectiveOperation::Create => "create",
            EffectiveOperation::Delete => "delete",
            EffectiveOperation::Remove => "remove",
            EffectiveOperation::None => "none",
        }
    }
}

impl std::fmt::Display for EffectiveOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.xml_value())
    }
}

// ===== impl ErrorType =====

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorType::Transport => write!(f, "transport"),
            ErrorType::Rpc => write!(f, "rpc"),
            ErrorType::Protocol => write!(f, "protocol"),
            ErrorType::Application => write!(f, "application"),
        }
    }
}

// ===== impl ErrorTag =====

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::PartialOperation => "partial-operation",
            ErrorTag::MalformedMessage => "malformed-message",
        }
    }
}

impl std::fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ===== impl ErrorSeverity =====

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Warning => write!(f, "warning"),
        }
    }
}

// ===== impl RpcError =====

impl RpcError {
    pub fn new(
        error_type: ErrorType,
        tag: ErrorTag,
        message: impl Into<String>,
    ) -> RpcError {
        RpcError {
            error_type,
            tag,
            severity: ErrorSeverity::Error,
            app_tag: None,
            message: message.into(),
            info: None,
        }
    }

    pub fn warning(
        error_type: ErrorType,
        tag: ErrorTag,
        message: impl Into<String>,
    ) -> RpcError {
        RpcError {
            severity: ErrorSeverity::Warning,
            ..RpcError::new(error_type, tag, message)
        }
    }

    pub fn with_app_tag(mut self, app_tag: impl Into<String>) -> RpcError {
        self.app_tag = Some(app_tag.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> RpcError {
        self.info = Some(info.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == ErrorSeverity::Warning
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.error_type, self.tag, self.severity, self.message
        )?;
        if let Some(info) = &self.info {
            write!(f, " [{info}]")?;
        }
        Ok(())
    }
}
