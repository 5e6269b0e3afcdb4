//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use netconf_utils::Responder;

use crate::rpc::{DomRpcResult, NetconfRpc};

pub type SessionId = u32;

// Session -> Device requests.
#[derive(Debug)]
pub enum Request {
    // Request to execute an RPC.
    Rpc(RpcRequest),
    // Request to close a session, releasing the locks it holds.
    Close(CloseRequest),
}

#[derive(Debug)]
pub struct RpcRequest {
    pub session_id: SessionId,
    pub rpc: NetconfRpc,
    pub responder: Responder<DomRpcResult>,
}

#[derive(Debug)]
pub struct CloseRequest {
    pub session_id: SessionId,
}
