//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

use crate::RemoteDeviceId;
use crate::capabilities::Capabilities;

// Mounted device configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub name: String,
    // Lock the edited datastores for the duration of each transaction.
    pub lock_datastore: bool,
    // Request rollback-on-error when the device supports it.
    pub rollback_on_error: bool,
    // Use "create" instead of "replace" for put operations on
    // candidate-running devices.
    pub create_on_put: bool,
    pub capabilities: Vec<String>,
}

// ===== impl DeviceConfig =====

impl DeviceConfig {
    pub fn device_id(&self) -> RemoteDeviceId {
        RemoteDeviceId::new(&self.name)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::from_names(&self.capabilities)
    }
}

impl Default for DeviceConfig {
    fn default() -> DeviceConfig {
        DeviceConfig {
            name: "local".to_owned(),
            lock_datastore: true,
            rollback_on_error: true,
            create_on_put: false,
            capabilities: vec![
                "candidate".to_owned(),
                "rollback-on-error".to_owned(),
                "validate".to_owned(),
            ],
        }
    }
}
