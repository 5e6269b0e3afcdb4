//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use futures::future;
use itertools::Itertools;
use netconf_yang::{ErrorSeverity, ErrorTag, ErrorType};

use crate::RemoteDeviceId;
use crate::error::DocumentedError;
use crate::rpc::{DomRpcResult, RpcFuture};

/// Aggregates the replies of the RPCs issued by a transaction into a single
/// outcome.
///
/// Replies are inspected in the order the RPCs were issued. The first reply
/// carrying errors determines the type, tag and severity of the failure. A
/// transport failure of any RPC is reported as `operation-failed`.
pub async fn results_to_tx_status(
    device: RemoteDeviceId,
    results: Vec<RpcFuture>,
) -> Result<(), DocumentedError> {
    let replies = future::join_all(results)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| {
            DocumentedError::new(
                format!("{device}: RPC during tx returned an exception: {error}"),
                ErrorType::Application,
                ErrorTag::OperationFailed,
                ErrorSeverity::Error,
            )
        })?;

    extract_result(&device, replies)
}

fn extract_result(
    device: &RemoteDeviceId,
    replies: Vec<DomRpcResult>,
) -> Result<(), DocumentedError> {
    let failed = replies
        .into_iter()
        .filter(|reply| !reply.is_success())
        .collect::<Vec<_>>();
    let Some(first) = failed.first().and_then(|reply| reply.errors.first())
    else {
        return Ok(());
    };

    let message = failed
        .iter()
        .filter_map(|reply| reply.errors.first())
        .map(|error| match &error.info {
            Some(info) => format!("{} {}", error.message, info),
            None => error.message.clone(),
        })
        .join(" ");
    let error = DocumentedError::new(
        format!("{device}: RPC during tx failed. {message}"),
        first.error_type,
        first.tag,
        first.severity,
    );
    let errors = failed.into_iter().flat_map(|reply| reply.errors).collect();

    Err(error.with_errors(errors))
}

// ===== unit tests =====
