//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use netconf_client::TxChain;
use netconf_client::capabilities::Capabilities;
use netconf_client::error::Error;
use netconf_yang::{ErrorTag, LogicalDatastoreType};

use super::*;

const CONFIG: LogicalDatastoreType = LogicalDatastoreType::Configuration;

fn chain(service: &Arc<ScriptedService>, recorder: &Arc<Recorder>) -> TxChain {
    let broker = broker(service, Capabilities::CANDIDATE, &device_config());
    broker.create_transaction_chain(recorder.clone())
}

fn count(events: &[String], prefix: &str) -> usize {
    events.iter().filter(|event| event.starts_with(prefix)).count()
}

#[tokio::test]
async fn single_open_transaction() {
    let service = ScriptedService::new();
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx1 = chain.new_write_only_transaction().unwrap();
    assert_eq!(
        chain.new_write_only_transaction().unwrap_err(),
        Error::TransactionPending(tx1.id())
    );
    assert!(matches!(
        chain.new_read_write_transaction(),
        Err(Error::TransactionPending(_))
    ));
    // Reads aren't restricted.
    assert!(chain.new_read_only_transaction().is_ok());

    // Submitting the open transaction allows the next one.
    tx1.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let commit = tx1.commit().unwrap();
    let tx2 = chain.new_read_write_transaction().unwrap();
    assert_eq!(
        chain.new_write_only_transaction().unwrap_err(),
        Error::TransactionPending(tx2.id())
    );

    // So does cancelling it.
    assert!(tx2.cancel());
    let tx3 = chain.new_write_only_transaction().unwrap();
    tx3.cancel();

    commit.await.unwrap();
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn success_after_close() {
    let service = ScriptedService::new();
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx = chain.new_write_only_transaction().unwrap();
    tx.put(CONFIG, &artist_path("Foo Fighters"), artist("Foo Fighters"))
        .unwrap();
    let commit = tx.commit().unwrap();

    // The submitted transaction is still pending.
    chain.close();
    assert!(chain.is_closed());
    assert!(recorder.events().is_empty());

    commit.await.unwrap();
    assert_eq!(recorder.events(), strings(&["chain successful"]));

    // Closing again has no effect.
    chain.close();
    assert_eq!(recorder.events(), strings(&["chain successful"]));
}

#[tokio::test]
async fn success_on_close_when_idle() {
    let service = ScriptedService::new();
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    chain.close();
    assert_eq!(recorder.events(), strings(&["chain successful"]));
    assert_eq!(
        chain.new_write_only_transaction().unwrap_err(),
        Error::ChainClosed
    );
    assert_eq!(
        chain.new_read_only_transaction().unwrap_err(),
        Error::ChainClosed
    );
    assert!(service.issued().is_empty());
}

#[tokio::test]
async fn success_after_cancel_of_open_transaction() {
    let service = ScriptedService::new();
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx = chain.new_write_only_transaction().unwrap();
    chain.close();
    assert!(recorder.events().is_empty());

    assert!(tx.cancel());
    assert_eq!(recorder.events(), strings(&["chain successful"]));
}

#[tokio::test]
async fn failure_cancels_open_transaction() {
    let service = ScriptedService::new();
    service.script("edit-config(candidate)", Reply::Error(ErrorTag::InvalidValue));
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx1 = chain.new_write_only_transaction().unwrap();
    tx1.put(CONFIG, &artist_path("Foo Fighters"), artist("Foo Fighters"))
        .unwrap();
    let commit = tx1.commit().unwrap();
    let tx2 = chain.new_write_only_transaction().unwrap();

    let error = commit.await.unwrap_err();
    assert_eq!(error.error_tag(), ErrorTag::InvalidValue);
    assert_eq!(
        recorder.events(),
        vec![format!("chain failed {} invalid-value", tx1.id())]
    );

    // The open transaction was cancelled on behalf of the chain.
    assert!(tx2.is_finished());
    assert_eq!(
        tx2.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave")),
        Err(Error::TransactionFinished(tx2.id()))
    );
    assert_eq!(
        chain.new_write_only_transaction().unwrap_err(),
        Error::ChainFailed
    );

    // A failed chain never succeeds.
    chain.close();
    assert_eq!(count(&recorder.events(), "chain successful"), 0);
}

#[tokio::test]
async fn failure_notified_once() {
    let service = ScriptedService::new();
    service.script("commit", Reply::Error(ErrorTag::OperationFailed));
    service.script("commit", Reply::Error(ErrorTag::ResourceDenied));
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx1 = chain.new_write_only_transaction().unwrap();
    let commit1 = tx1.commit().unwrap();
    let tx2 = chain.new_write_only_transaction().unwrap();
    let commit2 = tx2.commit().unwrap();
    chain.close();

    assert!(commit1.await.is_err());
    assert!(commit2.await.is_err());
    let events = recorder.events();
    assert_eq!(count(&events, "chain failed"), 1);
    assert_eq!(count(&events, "chain successful"), 0);
}

#[test]
fn commit_without_runtime() {
    let service = ScriptedService::new();
    let recorder = Recorder::new();
    let chain = chain(&service, &recorder);

    let tx = chain.new_write_only_transaction().unwrap();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let commit = tx.commit().unwrap();
    chain.close();

    // The outcome is processed by the caller polling the commit.
    futures::executor::block_on(commit).unwrap();
    assert_eq!(
        service.issued(),
        strings(&[
            "lock(candidate)",
            "edit-config(candidate)",
            "commit",
            "unlock(candidate)",
        ])
    );
    assert_eq!(recorder.events(), strings(&["chain successful"]));
}
