//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use netconf_client::capabilities::Capabilities;
use netconf_client::config::DeviceConfig;
use netconf_client::error::Error;
use netconf_client::rpc::{Datastore, NetconfRpc};
use netconf_client::transaction::TxListener;
use netconf_client::transaction::write::WriteTxKind;
use netconf_yang::{
    DataNode, EffectiveOperation, ErrorTag, ErrorType, LogicalDatastoreType,
};

use super::*;

const CONFIG: LogicalDatastoreType = LogicalDatastoreType::Configuration;

fn candidate_broker(service: &Arc<ScriptedService>) -> netconf_client::DataBroker {
    broker(service, Capabilities::CANDIDATE, &device_config())
}

#[tokio::test]
async fn lock_edit_commit_unlock() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);
    assert_eq!(broker.kind(), WriteTxKind::Candidate);

    let tx = broker.new_write_only_transaction();
    assert_eq!(service.issued(), strings(&["lock(candidate)"]));

    tx.put(CONFIG, &artist_path("Foo Fighters"), artist("Foo Fighters"))
        .unwrap();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    tx.delete(CONFIG, &artist_path("Lizzo")).unwrap();

    tx.commit().unwrap().await.unwrap();
    assert_eq!(
        service.issued(),
        strings(&[
            "lock(candidate)",
            "edit-config(candidate)",
            "edit-config(candidate)",
            "edit-config(candidate)",
            "commit",
            "unlock(candidate)",
        ])
    );
}

#[tokio::test]
async fn edit_operations() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    tx.put(CONFIG, &artist_path("Foo Fighters"), artist("Foo Fighters"))
        .unwrap();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    tx.delete(CONFIG, &artist_path("Lizzo")).unwrap();

    let edits = service
        .issued_rpcs()
        .into_iter()
        .filter_map(|rpc| match rpc {
            NetconfRpc::EditConfig {
                target,
                default_operation,
                rollback_on_error,
                edit,
            } => Some((target, default_operation, rollback_on_error, edit)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(edits.len(), 3);

    // put: replace the addressed node.
    let (target, default_operation, rollback_on_error, edit) = &edits[0];
    assert_eq!(*target, Datastore::Candidate);
    assert_eq!(*default_operation, None);
    assert!(!rollback_on_error);
    assert_eq!(edit.operation, Some(EffectiveOperation::Replace));
    assert_eq!(edit.data, Some(artist("Foo Fighters")));

    // merge: no operation at all, the device merges.
    let (_, default_operation, _, edit) = &edits[1];
    assert_eq!(*default_operation, None);
    assert_eq!(edit.operation, None);
    assert_eq!(edit.path, artist_path("Nick Cave"));

    // delete: explicit delete, nothing else touched.
    let (_, default_operation, _, edit) = &edits[2];
    assert_eq!(*default_operation, Some(EffectiveOperation::None));
    assert_eq!(edit.operation, Some(EffectiveOperation::Delete));
    assert_eq!(edit.data, None);

    tx.cancel();
}

#[tokio::test]
async fn rollback_on_error_requires_capability() {
    let service = ScriptedService::new();
    let broker = broker(
        &service,
        Capabilities::CANDIDATE | Capabilities::ROLLBACK_ON_ERROR,
        &device_config(),
    );

    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let rpcs = service.issued_rpcs();
    let (_, rollback_on_error) = rpcs
        .iter()
        .find_map(|rpc| rpc.as_edit_config())
        .map(|(target, _, rollback_on_error, _)| (*target, *rollback_on_error))
        .unwrap();
    assert!(rollback_on_error);

    // Disabled by configuration.
    let service = ScriptedService::new();
    let config = DeviceConfig {
        rollback_on_error: false,
        ..device_config()
    };
    let broker = super::broker(
        &service,
        Capabilities::CANDIDATE | Capabilities::ROLLBACK_ON_ERROR,
        &config,
    );
    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let rpcs = service.issued_rpcs();
    let rollback_on_error = rpcs
        .iter()
        .find_map(|rpc| rpc.as_edit_config())
        .map(|(_, _, rollback_on_error, _)| *rollback_on_error)
        .unwrap();
    assert!(!rollback_on_error);
}

#[tokio::test]
async fn failed_edit_discards_and_unlocks() {
    let service = ScriptedService::new();
    service.script("edit-config(candidate)", Reply::Error(ErrorTag::InvalidValue));
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    tx.put(CONFIG, &artist_path("Foo Fighters"), artist("Foo Fighters"))
        .unwrap();
    let error = tx.commit().unwrap().await.unwrap_err();

    assert_eq!(error.tx, tx.id());
    assert_eq!(error.error_tag(), ErrorTag::InvalidValue);
    assert_eq!(error.error_type(), ErrorType::Protocol);
    assert!(error.cause.message.contains("RPC during tx failed"));
    assert_eq!(
        service.issued(),
        strings(&[
            "lock(candidate)",
            "edit-config(candidate)",
            "commit",
            "discard-changes",
            "unlock(candidate)",
        ])
    );
}

#[tokio::test]
async fn failed_lock_fails_commit() {
    let service = ScriptedService::new();
    service.script("lock(candidate)", Reply::Error(ErrorTag::LockDenied));
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let error = tx.commit().unwrap().await.unwrap_err();
    assert_eq!(error.error_tag(), ErrorTag::LockDenied);
}

#[tokio::test]
async fn transport_failure_fails_commit() {
    let service = ScriptedService::new();
    service.script("commit", Reply::Transport);
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    let error = tx.commit().unwrap().await.unwrap_err();
    assert_eq!(error.error_tag(), ErrorTag::OperationFailed);
    assert_eq!(error.error_type(), ErrorType::Application);
    assert!(error.cause.message.contains("returned an exception"));
}

#[tokio::test]
async fn finished_after_commit() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    let commit = tx.commit().unwrap();
    assert!(tx.is_finished());

    let path = artist_path("Foo Fighters");
    assert_eq!(
        tx.put(CONFIG, &path, artist("Foo Fighters")),
        Err(Error::TransactionFinished(tx.id()))
    );
    assert_eq!(
        tx.merge(CONFIG, &path, artist("Foo Fighters")),
        Err(Error::TransactionFinished(tx.id()))
    );
    assert_eq!(
        tx.delete(CONFIG, &path),
        Err(Error::TransactionFinished(tx.id()))
    );
    assert!(matches!(tx.commit(), Err(Error::TransactionFinished(_))));
    assert!(!tx.cancel());

    commit.await.unwrap();
    assert_eq!(
        service.issued(),
        strings(&["lock(candidate)", "commit", "unlock(candidate)"])
    );
}

#[tokio::test]
async fn cancel() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);
    let recorder = Recorder::new();

    let tx = broker.new_write_only_transaction();
    let listener: Arc<dyn TxListener> = recorder.clone();
    let _registration = tx.add_listener(Arc::downgrade(&listener));
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();

    assert!(tx.cancel());
    assert!(!tx.cancel());
    assert!(tx.is_finished());
    assert!(matches!(tx.commit(), Err(Error::TransactionFinished(_))));
    assert_eq!(
        tx.delete(CONFIG, &artist_path("Nick Cave")),
        Err(Error::TransactionFinished(tx.id()))
    );

    assert_eq!(
        service.issued(),
        strings(&[
            "lock(candidate)",
            "edit-config(candidate)",
            "discard-changes",
            "unlock(candidate)",
        ])
    );
    assert_eq!(recorder.events(), vec![format!("cancelled {}", tx.id())]);
}

#[tokio::test]
async fn cancel_awaits_issued_replies() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    assert!(tx.cancel());

    // Replies of the lock and edit issued before the cancel are still
    // consumed, along with those of the cleanup.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let mut replied = service.replied();
    replied.sort();
    assert_eq!(
        replied,
        strings(&[
            "discard-changes",
            "edit-config(candidate)",
            "lock(candidate)",
            "unlock(candidate)",
        ])
    );
}

#[tokio::test]
async fn listener_events() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);
    let recorder = Recorder::new();
    let listener: Arc<dyn TxListener> = recorder.clone();

    let tx = broker.new_write_only_transaction();
    let _registration = tx.add_listener(Arc::downgrade(&listener));
    tx.commit().unwrap().await.unwrap();
    assert_eq!(
        recorder.events(),
        vec![
            format!("submitted {}", tx.id()),
            format!("successful {}", tx.id()),
        ]
    );

    // Dropping the registration stops the notifications.
    let service = ScriptedService::new();
    service.script("commit", Reply::Error(ErrorTag::OperationFailed));
    let broker = candidate_broker(&service);
    let recorder = Recorder::new();
    let listener: Arc<dyn TxListener> = recorder.clone();

    let tx = broker.new_write_only_transaction();
    let registration = tx.add_listener(Arc::downgrade(&listener));
    drop(registration);
    assert!(tx.commit().unwrap().await.is_err());
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn invalid_store() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    let operational = LogicalDatastoreType::Operational;
    assert_eq!(
        tx.put(operational, &artist_path("Foo Fighters"), artist("Foo Fighters")),
        Err(Error::InvalidStore(operational))
    );
    assert_eq!(
        tx.delete(operational, &artist_path("Foo Fighters")),
        Err(Error::InvalidStore(operational))
    );
    assert_eq!(service.issued(), strings(&["lock(candidate)"]));
    assert!(!tx.is_finished());
    tx.cancel();
}

#[tokio::test]
async fn top_level_mixin_is_ignored() {
    let service = ScriptedService::new();
    let broker = candidate_broker(&service);

    let tx = broker.new_write_only_transaction();
    let playlists = DataNode::map("example-jukebox:playlist", Vec::new());
    tx.put(CONFIG, &path("/example-jukebox:playlist"), playlists.clone())
        .unwrap();
    tx.merge(CONFIG, &path("/example-jukebox:playlist"), playlists)
        .unwrap();
    assert_eq!(service.issued(), strings(&["lock(candidate)"]));

    // Nested mixins are sent.
    let artists = DataNode::map("artist", vec![artist("Nick Cave")]);
    tx.merge(CONFIG, &path("/example-jukebox:jukebox/library/artist"), artists)
        .unwrap();
    assert_eq!(
        service.issued(),
        strings(&["lock(candidate)", "edit-config(candidate)"])
    );
    tx.cancel();
}

#[tokio::test]
async fn locking_disabled() {
    let service = ScriptedService::new();
    let config = DeviceConfig {
        lock_datastore: false,
        ..device_config()
    };
    let broker = broker(&service, Capabilities::CANDIDATE, &config);

    let tx = broker.new_write_only_transaction();
    tx.merge(CONFIG, &artist_path("Nick Cave"), artist("Nick Cave"))
        .unwrap();
    tx.commit().unwrap().await.unwrap();
    assert_eq!(
        service.issued(),
        strings(&["edit-config(candidate)", "commit"])
    );

    // Failure cleanup still discards the candidate.
    service.script("commit", Reply::Error(ErrorTag::OperationFailed));
    let tx = broker.new_write_only_transaction();
    assert!(tx.commit().unwrap().await.is_err());
    assert_eq!(
        service.issued(),
        strings(&[
            "edit-config(candidate)",
            "commit",
            "commit",
            "discard-changes",
        ])
    );
}
