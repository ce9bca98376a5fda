//! The record tree produced by ingestion.
//!
//! All four types are plain values: constructed once while the log is being
//! parsed, never mutated afterwards, compared structurally. Each container
//! owns its children by value, so a finished tree can be handed to any
//! read-only consumer as-is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single weighted reasoning path attributed to a human or machine origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonPath {
    pub weight: f64,
    pub content: String,
}

/// One evaluated data point, joined from its log line and its detail document.
///
/// `human_paths.len() + machine_paths.len()` always equals the size pair
/// declared on the sample's log line; [`crate::parse::parse_sample`] rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub error: f64,
    pub target: Vec<i64>,
    pub result: Vec<f64>,
    pub human_paths: Vec<ReasonPath>,
    pub machine_paths: Vec<ReasonPath>,
}

/// A group of samples sharing one declared pair of path counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub human_size: usize,
    pub machine_size: usize,
    pub samples: Vec<Sample>,
}

/// A top-level run, identified by story, sentence index and character label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub story: Uuid,
    pub sentence: u32,
    pub character: String,
    pub instances: Vec<Instance>,
}
