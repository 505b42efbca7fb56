//! Immutable scene snapshots.
//!
//! A snapshot is the scene's shape records serialized with MessagePack, which
//! keeps long histories compact and makes deep equality a byte comparison.

use anyhow::Result;

use mapscribe_core::{scene_from_records, scene_to_records, Scene, ShapeRecord};

/// Serialized, self-contained copy of a scene at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Vec<u8>,
}

impl Snapshot {
    /// Serialize the scene
    pub fn capture(scene: &Scene) -> Result<Self> {
        let records = scene_to_records(scene);
        let bytes = rmp_serde::to_vec_named(&records)?;
        Ok(Self { bytes })
    }

    /// Decode the records in z-order
    pub fn records(&self) -> Result<Vec<ShapeRecord>> {
        Ok(rmp_serde::from_slice(&self.bytes)?)
    }

    /// Rebuild a scene from this snapshot
    pub fn restore(&self) -> Result<Scene> {
        scene_from_records(&self.records()?)
    }

    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
