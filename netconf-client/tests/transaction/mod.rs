//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

mod candidate;
mod chain;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

use futures::FutureExt;
use netconf_client::capabilities::Capabilities;
use netconf_client::config::DeviceConfig;
use netconf_client::error::{CommitFailed, TransportError};
use netconf_client::rpc::{DomRpcResult, NetconfRpc, RpcFuture, RpcService};
use netconf_client::transaction::chain::{ChainId, TxChainListener};
use netconf_client::transaction::write::WriteTx;
use netconf_client::transaction::{TxId, TxListener};
use netconf_client::{DataBroker, RemoteDeviceId};
use netconf_yang::{DataNode, ErrorTag, ErrorType, InstancePath, RpcError};

// Scripted reply to an RPC.
#[derive(Clone, Debug)]
pub enum Reply {
    Ok,
    Error(ErrorTag),
    Transport,
    Data(DataNode),
}

// RPC service double recording every issued RPC and answering from a
// per-operation script. Unscripted RPCs succeed.
#[derive(Debug, Default)]
pub struct ScriptedService {
    issued: Mutex<Vec<NetconfRpc>>,
    // RPCs whose reply was awaited.
    replied: Arc<Mutex<Vec<String>>>,
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
}

// Listener recording every transaction and chain event.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<String>>,
}

// ===== impl ScriptedService =====

impl ScriptedService {
    pub fn new() -> Arc<ScriptedService> {
        Arc::new(ScriptedService::default())
    }

    // Queues a reply for the next RPC displayed as `rpc`, e.g.
    // "edit-config(candidate)".
    pub fn script(&self, rpc: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .entry(rpc.to_owned())
            .or_default()
            .push_back(reply);
    }

    pub fn issued(&self) -> Vec<String> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .map(|rpc| rpc.to_string())
            .collect()
    }

    pub fn issued_rpcs(&self) -> Vec<NetconfRpc> {
        self.issued.lock().unwrap().clone()
    }

    pub fn replied(&self) -> Vec<String> {
        self.replied.lock().unwrap().clone()
    }
}

impl RpcService for ScriptedService {
    fn invoke(&self, rpc: NetconfRpc) -> RpcFuture {
        let key = rpc.to_string();
        self.issued.lock().unwrap().push(rpc);
        let reply = self
            .script
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|replies| replies.pop_front())
            .unwrap_or(Reply::Ok);

        let result = match reply {
            Reply::Ok => Ok(DomRpcResult::success()),
            Reply::Error(tag) => {
                Ok(DomRpcResult::with_errors(vec![RpcError::new(
                    ErrorType::Protocol,
                    tag,
                    format!("{key} failed"),
                )]))
            }
            Reply::Transport => Err(TransportError::Disconnected(format!(
                "connection reset during {key}"
            ))),
            Reply::Data(data) => Ok(DomRpcResult::with_data(data)),
        };
        let replied = self.replied.clone();
        async move {
            replied.lock().unwrap().push(key);
            result
        }
        .boxed()
    }
}

// ===== impl Recorder =====

impl Recorder {
    pub fn new() -> Arc<Recorder> {
        Arc::new(Recorder::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl TxListener for Recorder {
    fn on_transaction_cancelled(&self, tx: &WriteTx) {
        self.record(format!("cancelled {}", tx.id()));
    }

    fn on_transaction_submitted(&self, tx: &WriteTx) {
        self.record(format!("submitted {}", tx.id()));
    }

    fn on_transaction_successful(&self, tx: &WriteTx) {
        self.record(format!("successful {}", tx.id()));
    }

    fn on_transaction_failed(&self, tx: &WriteTx, cause: &CommitFailed) {
        self.record(format!("failed {} {}", tx.id(), cause.error_tag()));
    }
}

impl TxChainListener for Recorder {
    fn on_transaction_chain_successful(&self, _chain: ChainId) {
        self.record("chain successful".to_owned());
    }

    fn on_transaction_chain_failed(
        &self,
        _chain: ChainId,
        tx: TxId,
        cause: &CommitFailed,
    ) {
        self.record(format!("chain failed {} {}", tx, cause.error_tag()));
    }
}

//
// Helper functions.
//

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt::Subscriber::builder()
            .with_target(false)
            .with_ansi(false)
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .init();
    });
}

pub fn device_config() -> DeviceConfig {
    DeviceConfig {
        name: "r1".to_owned(),
        ..Default::default()
    }
}

pub fn broker(
    service: &Arc<ScriptedService>,
    capabilities: Capabilities,
    config: &DeviceConfig,
) -> DataBroker {
    init_tracing();
    DataBroker::new(
        RemoteDeviceId::new(&config.name),
        service.clone(),
        capabilities,
        config,
    )
    .unwrap()
}

pub fn path(path: &str) -> InstancePath {
    path.parse().unwrap()
}

pub fn artist(name: &str) -> DataNode {
    DataNode::map_entry("artist", [("name", name)], vec![DataNode::leaf(
        "genre", "rock",
    )])
}

pub fn artist_path(name: &str) -> InstancePath {
    path(&format!("/example-jukebox:jukebox/library/artist[name='{name}']"))
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
