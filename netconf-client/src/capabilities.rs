//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::warn;

const URN_PREFIX: &str = "urn:ietf:params:netconf:capability:";

bitflags! {
    // NETCONF capabilities relevant to write transactions.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct Capabilities: u8 {
        const CANDIDATE = 0x01;
        const WRITABLE_RUNNING = 0x02;
        const ROLLBACK_ON_ERROR = 0x04;
        const VALIDATE = 0x08;
    }
}

// ===== impl Capabilities =====

impl Capabilities {
    // Parses a capability given either by its short name (e.g. "candidate")
    // or by its full URN.
    pub fn parse_name(name: &str) -> Option<Capabilities> {
        let name = name.strip_prefix(URN_PREFIX).unwrap_or(name);
        let name = name.split(':').next().unwrap_or(name);
        match name {
            "candidate" => Some(Capabilities::CANDIDATE),
            "writable-running" => Some(Capabilities::WRITABLE_RUNNING),
            "rollback-on-error" => Some(Capabilities::ROLLBACK_ON_ERROR),
            "validate" => Some(Capabilities::VALIDATE),
            _ => None,
        }
    }

    // Parses a capability list. Unknown capabilities are ignored.
    pub fn from_names<I, S>(names: I) -> Capabilities
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .fold(Capabilities::empty(), |capabilities, name| {
                let name = name.as_ref();
                match Capabilities::parse_name(name) {
                    Some(capability) => capabilities | capability,
                    None => {
                        warn!(capability = %name, "ignoring unknown capability");
                        capabilities
                    }
                }
            })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "CANDIDATE" => "candidate",
                "WRITABLE_RUNNING" => "writable-running",
                "ROLLBACK_ON_ERROR" => "rollback-on-error",
                _ => "validate",
            })
            .collect()
    }
}

// ===== unit tests =====
