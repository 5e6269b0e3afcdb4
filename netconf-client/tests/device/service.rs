//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use netconf_client::capabilities::Capabilities;
use netconf_client::config::DeviceConfig;
use netconf_client::error::Error;
use netconf_client::service::{DataTreeService, DataTreeServiceKind};
use netconf_yang::{EffectiveOperation, ErrorTag, LogicalDatastoreType};

use super::*;

const CONFIG: LogicalDatastoreType = LogicalDatastoreType::Configuration;

fn service(
    device: &LocalDeviceHandle,
    capabilities: Capabilities,
    config: &DeviceConfig,
) -> (DataTreeService, SessionClient) {
    let session = device.connect();
    let service =
        DataTreeService::new(ops(&session), capabilities, config).unwrap();
    (service, session)
}

#[tokio::test]
async fn candidate_with_running() {
    let capabilities = Capabilities::CANDIDATE
        | Capabilities::WRITABLE_RUNNING
        | Capabilities::ROLLBACK_ON_ERROR;
    let device = spawn_device(capabilities, jukebox("Nick Cave"));
    let (service, _session) = service(&device, capabilities, &config());
    assert_eq!(service.kind(), DataTreeServiceKind::CandidateWithRunning);

    assert!(service.lock().await.unwrap().is_success());

    // Another session can't lock either datastore.
    let other = device.connect();
    let reply = ops(&other).lock_running().await.unwrap();
    assert_eq!(reply.errors[0].tag, ErrorTag::LockDenied);

    let reply = service
        .merge(
            CONFIG,
            &artist_path("Lizzo"),
            artist("Lizzo", &[("genre", "pop")]),
            None,
        )
        .unwrap()
        .await
        .unwrap();
    assert!(reply.is_success());

    // Edits land on the candidate until committed.
    assert!(!running(&device).await.contains(&artist_path("Lizzo")));
    assert!(service.commit().await.unwrap().is_success());
    assert!(running(&device).await.contains(&artist_path("Lizzo")));

    // Edit errors are returned as part of the reply.
    let reply = service
        .delete(CONFIG, &artist_path("Foo Fighters"))
        .unwrap()
        .await
        .unwrap();
    assert_eq!(reply.errors[0].tag, ErrorTag::DataMissing);
    let reply = service
        .create(
            CONFIG,
            &artist_path("Nick Cave"),
            artist("Nick Cave", &[]),
            None,
        )
        .unwrap()
        .await
        .unwrap();
    assert_eq!(reply.errors[0].tag, ErrorTag::DataExists);

    // Removing missing data is fine.
    let reply = service
        .remove(CONFIG, &artist_path("Foo Fighters"))
        .unwrap()
        .await
        .unwrap();
    assert!(reply.is_success());

    let reply = service
        .replace(
            CONFIG,
            &artist_path("Nick Cave"),
            artist("Nick Cave", &[("genre", "blues")]),
            None,
        )
        .unwrap()
        .await
        .unwrap();
    assert!(reply.is_success());
    assert!(service.discard_changes().await.unwrap().is_success());
    assert_eq!(candidate(&device).await, running(&device).await);

    assert!(service.unlock().await.unwrap().is_success());
    let reply = ops(&other).lock_running().await.unwrap();
    assert!(reply.is_success());
}

#[tokio::test]
async fn reads() {
    let capabilities = Capabilities::CANDIDATE;
    let device = spawn_device(capabilities, jukebox("Nick Cave"));
    let (service, _session) = service(&device, capabilities, &config());
    assert_eq!(service.kind(), DataTreeServiceKind::Candidate);

    let data = service
        .get_config(&artist_path("Nick Cave"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(leaf_value(&data, "genre"), Some("rock"));

    let data = service
        .get(&path("/example-jukebox:jukebox/library"))
        .await
        .unwrap();
    assert!(data.is_some());

    // Only the requested fields are returned.
    let data = service
        .get_config_fields(
            &path("/example-jukebox:jukebox/library"),
            vec![path("/artist/name")],
        )
        .await
        .unwrap()
        .unwrap();
    let entry = data.children()[0].children()[0].clone();
    assert_eq!(leaf_value(&entry, "name"), Some("Nick Cave"));
    assert_eq!(leaf_value(&entry, "genre"), None);

    assert_eq!(
        service
            .get_fields(&path("/example-jukebox:jukebox"), Vec::new())
            .await,
        Err(Error::EmptyFields)
    );
}

#[tokio::test]
async fn running_only() {
    let capabilities = Capabilities::WRITABLE_RUNNING;
    let device = spawn_device(capabilities, DataTree::new());
    let (service, _session) = service(&device, capabilities, &config());
    assert_eq!(service.kind(), DataTreeServiceKind::Running);

    assert!(service.lock().await.unwrap().is_success());
    let reply = service
        .merge(
            CONFIG,
            &artist_path("Lizzo"),
            artist("Lizzo", &[]),
            Some(EffectiveOperation::Merge),
        )
        .unwrap()
        .await
        .unwrap();
    assert!(reply.is_success());
    assert!(running(&device).await.contains(&artist_path("Lizzo")));

    // Nothing to commit or discard without a candidate.
    assert!(service.commit().await.unwrap().is_success());
    assert!(service.discard_changes().await.unwrap().is_success());
    assert!(service.unlock().await.unwrap().is_success());

    assert_eq!(
        service
            .merge(
                LogicalDatastoreType::Operational,
                &artist_path("Lizzo"),
                artist("Lizzo", &[]),
                None,
            )
            .err(),
        Some(Error::InvalidStore(LogicalDatastoreType::Operational))
    );
}

#[tokio::test]
async fn locking_disabled() {
    let capabilities = Capabilities::CANDIDATE;
    let device = spawn_device(capabilities, DataTree::new());
    let config = DeviceConfig {
        lock_datastore: false,
        ..config()
    };
    let (service, _session) = service(&device, capabilities, &config);

    assert!(service.lock().await.unwrap().is_success());
    let other = device.connect();
    assert!(ops(&other).lock_candidate().await.unwrap().is_success());
    assert!(service.unlock().await.unwrap().is_success());
}

#[tokio::test]
async fn unsupported_device() {
    let device = spawn_device(Capabilities::VALIDATE, DataTree::new());
    let session = device.connect();
    let error = DataTreeService::new(
        ops(&session),
        Capabilities::VALIDATE,
        &config(),
    )
    .unwrap_err();
    assert!(matches!(error, Error::UnsupportedCapabilities(_)));
}
