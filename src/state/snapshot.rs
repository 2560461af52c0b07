// Serialized engine state
//
// Exported document shape: {version, timestamp, config: {...}} with
// camelCase keys. Every config field is independently optional on import,
// so an old or partial document applies cleanly.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::sequencer::StepGrid;
use crate::types::{AdsrParams, Timbre};

pub const DOCUMENT_VERSION: u32 = 1;

/// Per-track drum grids. A track missing on import comes back as `None`
/// and is restored as 16 falses rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrumSteps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kick: Option<StepGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snare: Option<StepGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hihat: Option<StepGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perc: Option<StepGrid>,
}

/// Everything the engine exposes for save/load. Fields are applied
/// independently on restore; `None` leaves the corresponding state alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timbre_type: Option<Timbre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melodic_steps: Option<StepGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drum_steps: Option<DrumSteps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envelope: Option<AdsrParams>,
}

/// The persisted/exported document wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDocument {
    pub version: u32,
    /// RFC 3339 creation timestamp.
    pub timestamp: String,
    pub config: EngineSnapshot,
}

impl PatchDocument {
    pub fn new(config: EngineSnapshot) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            timestamp: Utc::now().to_rfc3339(),
            config,
        }
    }
}
