//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use futures::FutureExt;
use futures::future;
use netconf_utils::UnboundedSender;
use tokio::sync::oneshot;

use crate::api::{CloseRequest, Request, RpcRequest, SessionId};
use crate::error::TransportError;
use crate::rpc::{NetconfRpc, RpcFuture, RpcService};

/// Client side of a NETCONF session.
///
/// Every RPC is sent as a message to the device task, which answers through
/// a oneshot channel.
#[derive(Clone, Debug)]
pub struct SessionClient {
    session_id: SessionId,
    request_tx: UnboundedSender<Request>,
}

// ===== impl SessionClient =====

impl SessionClient {
    pub(crate) fn new(
        session_id: SessionId,
        request_tx: UnboundedSender<Request>,
    ) -> SessionClient {
        SessionClient {
            session_id,
            request_tx,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    // Closes the session. Locks held by it are released by the device.
    pub fn close(&self) {
        let request = Request::Close(CloseRequest {
            session_id: self.session_id,
        });
        let _ = self.request_tx.send(request);
    }
}

impl RpcService for SessionClient {
    fn invoke(&self, rpc: NetconfRpc) -> RpcFuture {
        let (responder_tx, responder_rx) = oneshot::channel();
        let request = Request::Rpc(RpcRequest {
            session_id: self.session_id,
            rpc,
            responder: responder_tx,
        });
        if self.request_tx.send(request).is_err() {
            return future::ready(Err(TransportError::SessionClosed)).boxed();
        }

        async move {
            responder_rx
                .await
                .map_err(|_| TransportError::ReplyDropped)
        }
        .boxed()
    }
}
