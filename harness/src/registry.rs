use crate::error::{HarnessError, Result};
use logcheck_network::Transport;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Where a message type enters the pipeline and where its normalized event
/// comes back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTypeInfo {
    pub name: String,
    pub transport: Transport,
    pub destination_port: u16,
    pub result_port: u16,
}

impl MessageTypeInfo {
    pub fn new(
        name: impl Into<String>,
        transport: Transport,
        destination_port: u16,
        result_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            transport,
            destination_port,
            result_port,
        }
    }
}

#[derive(Deserialize)]
struct RegistryEntry {
    protocol: Transport,
    port: u16,
    receive_port: u16,
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::from_entries([
        MessageTypeInfo::new("epics_errlog", Transport::Tcp, 7004, 17771),
        MessageTypeInfo::new("caputlog", Transport::Tcp, 7011, 17772),
        // Straight to the pipeline; production traffic goes through a UDP tee on 54321
        MessageTypeInfo::new("plc", Transport::Udp, 54322, 17773),
        MessageTypeInfo::new("python_json_tcp", Transport::Tcp, 54320, 17774),
        MessageTypeInfo::new("python_json_udp", Transport::Udp, 54320, 17774),
        MessageTypeInfo::new("gateway_caputlog", Transport::Tcp, 17775, 17776),
    ])
});

/// Read-only table of message types, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, MessageTypeInfo>,
}

impl Registry {
    /// The standard deployment's message types.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn from_entries(entries: impl IntoIterator<Item = MessageTypeInfo>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|info| (info.name.clone(), info))
                .collect(),
        }
    }

    /// Parses a YAML mapping of `name: {protocol, port, receive_port}`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: BTreeMap<String, RegistryEntry> = serde_yaml::from_str(yaml)?;
        Ok(Self::from_entries(raw.into_iter().map(|(name, entry)| {
            MessageTypeInfo::new(name, entry.protocol, entry.port, entry.receive_port)
        })))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn lookup(&self, name: &str) -> Result<&MessageTypeInfo> {
        self.entries
            .get(name)
            .ok_or_else(|| HarnessError::UnknownMessageType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageTypeInfo> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
