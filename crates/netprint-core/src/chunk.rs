//! Chunk store: per-device groups of flat records
//!
//! Chunks are produced by the external flattener and are read-only here.

use crate::value::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered sequence of flat records
pub type Chunk = Vec<Record>;

/// All chunks collected from one device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceChunks {
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "Chunks", default)]
    chunks: BTreeMap<String, Chunk>,
}

impl DeviceChunks {
    pub fn new(device_name: impl Into<String>, chunks: BTreeMap<String, Chunk>) -> Self {
        Self {
            device_name: device_name.into(),
            chunks,
        }
    }

    /// Records of a chunk, or an empty slice when the chunk is absent
    pub fn lookup(&self, chunk_name: &str) -> &[Record] {
        self.chunks
            .get(chunk_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Chunk names in sorted order
    pub fn chunk_names(&self) -> impl Iterator<Item = &str> {
        self.chunks.keys().map(String::as_str)
    }
}

/// Chunks for every device in one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkStore {
    devices: Vec<DeviceChunks>,
}

impl ChunkStore {
    pub fn new(devices: Vec<DeviceChunks>) -> Self {
        Self { devices }
    }

    /// Records of a device's chunk; empty when the device or chunk is absent
    pub fn lookup(&self, device_name: &str, chunk_name: &str) -> &[Record] {
        self.device(device_name)
            .map(|d| d.lookup(chunk_name))
            .unwrap_or(&[])
    }

    pub fn device(&self, device_name: &str) -> Option<&DeviceChunks> {
        self.devices.iter().find(|d| d.device_name == device_name)
    }

    /// Devices in load order
    pub fn devices(&self) -> &[DeviceChunks] {
        &self.devices
    }
}
