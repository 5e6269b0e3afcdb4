//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;

use std::sync::Arc;

use clap::{App, Arg};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use netconf_client::device::LocalDevice;
use netconf_client::rpc::Datastore;
use netconf_client::transaction::chain::ChainId;
use netconf_client::transaction::write::WriteTx;
use netconf_client::{
    CommitFailed, DataBroker, Error, TxChain, TxChainListener, TxId,
};
use netconf_yang::{DataNode, DataTree, InstancePath, LogicalDatastoreType};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

const CONFIG: LogicalDatastoreType = LogicalDatastoreType::Configuration;

// Recorded transaction step.
#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case", deny_unknown_fields)]
enum Step {
    Put {
        path: InstancePath,
        data: DataNode,
    },
    Merge {
        path: InstancePath,
        data: DataNode,
    },
    Delete {
        path: InstancePath,
    },
    Commit,
    Cancel,
    Read {
        path: InstancePath,
        #[serde(default)]
        fields: Vec<InstancePath>,
    },
    CloseChain,
}

struct Replay {
    chain: TxChain,
    // Open write transaction.
    tx: Option<WriteTx>,
}

struct ChainLogger;

// ===== impl Replay =====

impl Replay {
    async fn run_step(&mut self, step: Step) {
        match step {
            Step::Put { path, data } => {
                let result = self.tx().and_then(|tx| tx.put(CONFIG, &path, data));
                log_error(result);
            }
            Step::Merge { path, data } => {
                let result =
                    self.tx().and_then(|tx| tx.merge(CONFIG, &path, data));
                log_error(result);
            }
            Step::Delete { path } => {
                let result = self.tx().and_then(|tx| tx.delete(CONFIG, &path));
                log_error(result);
            }
            Step::Commit => {
                let Some(tx) = self.tx.take() else {
                    warn!("no open transaction to commit");
                    return;
                };
                match tx.commit() {
                    Ok(commit) => match commit.await {
                        Ok(()) => info!(tx = %tx.id(), "transaction committed"),
                        Err(error) => error.log(),
                    },
                    Err(error) => error.log(),
                }
            }
            Step::Cancel => match self.tx.take() {
                Some(tx) => {
                    tx.cancel();
                }
                None => warn!("no open transaction to cancel"),
            },
            Step::Read { path, fields } => {
                let reader = match self.chain.new_read_only_transaction() {
                    Ok(reader) => reader,
                    Err(error) => {
                        error.log();
                        return;
                    }
                };
                let result = if fields.is_empty() {
                    reader.read(CONFIG, &path).await
                } else {
                    reader.read_fields(CONFIG, &path, fields).await
                };
                match result {
                    Ok(data) => print_json(&data),
                    Err(error) => error.log(),
                }
            }
            Step::CloseChain => self.chain.close(),
        }
    }

    // Returns the open write transaction, opening one if needed.
    fn tx(&mut self) -> Result<&WriteTx, Error> {
        if self.tx.as_ref().is_none_or(|tx| tx.is_finished()) {
            self.tx = Some(self.chain.new_write_only_transaction()?);
        }
        self.tx.as_ref().ok_or(Error::ChainClosed)
    }
}

// ===== impl ChainLogger =====

impl TxChainListener for ChainLogger {
    fn on_transaction_chain_successful(&self, chain: ChainId) {
        info!(%chain, "transaction chain successful");
    }

    fn on_transaction_chain_failed(
        &self,
        chain: ChainId,
        tx: TxId,
        cause: &CommitFailed,
    ) {
        error!(%chain, %tx, error = %cause.cause, "transaction chain failed");
    }
}

// ===== helper functions =====

fn log_error(result: Result<(), Error>) {
    if let Err(error) = result {
        error.log();
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(error) => error!(%error, "failed to serialize data"),
    }
}

fn init_tracing(config: &config::Logging) {
    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("netconf=debug".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file)
        .with(stdout)
        .init();
}

fn load_running(filename: Option<&str>) -> DataTree {
    let Some(filename) = filename else {
        return DataTree::new();
    };
    let data = std::fs::read_to_string(filename)
        .expect("Unable to read running configuration file");
    serde_json::from_str(&data)
        .expect("Failed to parse running configuration file")
}

// ===== main =====

#[tokio::main]
async fn main() {
    // Parse command-line parameters.
    let matches = App::new("Replay transactions")
        .about("Replay NETCONF transaction steps against a local device")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .arg(
            Arg::with_name("FILENAME")
                .help("Steps file path")
                .required(true)
                .index(1),
        )
        .get_matches();
    let config = Config::load(matches.value_of("config"));
    let filename = matches.value_of("FILENAME").unwrap();

    init_tracing(&config.logging);

    // Start the local device and mount it.
    let capabilities = config.device.capabilities();
    let running = load_running(config.running.as_deref());
    let device = LocalDevice::spawn(&config.device.name, capabilities, running);
    let broker = match DataBroker::new(
        config.device.device_id(),
        Arc::new(device.connect()),
        capabilities,
        &config.device,
    ) {
        Ok(broker) => broker,
        Err(error) => {
            error.log();
            std::process::exit(1);
        }
    };
    info!(kind = ?broker.kind(), "device mounted");

    let mut replay = Replay {
        chain: broker.create_transaction_chain(Arc::new(ChainLogger)),
        tx: None,
    };

    // Run the steps from the record file.
    for (lineno, line) in std::fs::read_to_string(filename)
        .expect("Unable to read steps file")
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
    {
        match serde_json::from_str::<Step>(line) {
            Ok(step) => replay.run_step(step).await,
            Err(error) => {
                error!(line = lineno + 1, %error, "failed to parse step");
                std::process::exit(1);
            }
        }
    }

    // Abandon any unfinished transaction and close the chain.
    if let Some(tx) = replay.tx.take()
        && tx.cancel()
    {
        warn!(tx = %tx.id(), "cancelled unfinished transaction");
    }
    replay.chain.close();

    match device.get_config(Datastore::Running).await {
        Ok(running) => print_json(&running),
        Err(error) => error!(%error, "failed to read running datastore"),
    }
}
