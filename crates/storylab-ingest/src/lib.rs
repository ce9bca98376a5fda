//! Ingestion of structured experiment logs into a typed record tree.
//!
//! An external generation run leaves behind a line-oriented log plus one JSON
//! detail document per evaluated sample. [`load_experiments`] reads both and
//! reassembles them into `Experiment → Instance → Sample → ReasonPath`
//! records, validating line grammars and cross-checked sizes along the way.
//! Any structural violation fails the whole load; nothing is repaired or
//! substituted.

pub mod error;
pub mod parse;
pub mod record;

pub use error::{IngestError, RecordKind, Result};
pub use parse::{load_experiments, parse_experiment, parse_instance, parse_sample};
pub use record::{Experiment, Instance, ReasonPath, Sample};
