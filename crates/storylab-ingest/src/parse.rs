//! Log segmentation and the per-record parsers.
//!
//! A log line carries a fixed-width timestamp field followed by one of four
//! markers: `Commencing`/`Concluding` delimit an experiment, `Summary` closes
//! an instance, and `Instance` describes a single sample whose numeric detail
//! lives in a JSON document named by the identifier embedded in the line.
//! Parsing walks these levels top-down and assembles records bottom-up.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{IngestError, RecordKind, Result};
use crate::record::{Experiment, Instance, ReasonPath, Sample};

/// Width of the fixed timestamp field on every log line.
const LINE_PREFIX_WIDTH: usize = 37;

static EXPERIMENT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Commencing|Concluding).*\(([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}), (\d), (.+)\)$",
    )
    .expect("experiment marker pattern")
});

static INSTANCE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Summary\D+(\d+)\D+(\d+).+$").expect("instance header pattern"));

static SAMPLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Instance (.{36})\D+(\d+)\D+(\d+).+$").expect("sample line pattern")
});

/// Parses a full experiment log plus its detail-file directory into the
/// ordered sequence of [`Experiment`] records it describes.
///
/// Order of the output matches order of appearance in the file. Any parse or
/// consistency failure in any chunk aborts the whole call; there are no
/// partial results.
pub fn load_experiments(log_path: &Path, detail_dir: &Path) -> Result<Vec<Experiment>> {
    let data = fs::read_to_string(log_path)?;
    let chunks = experiment_chunks(&data);
    tracing::debug!(chunks = chunks.len(), "segmented experiment log");

    let mut experiments = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        experiments.push(parse_experiment(chunk, detail_dir)?);
    }
    tracing::debug!(experiments = experiments.len(), "experiment log loaded");
    Ok(experiments)
}

/// Strips the timestamp field from every line and groups the marker lines
/// into `Commencing…Concluding` chunks.
///
/// A `Commencing` line while a chunk is still open silently discards the open
/// chunk and starts over; a trailing chunk with no `Concluding` is never
/// flushed. Lines outside the marker vocabulary are ignored.
fn experiment_chunks(data: &str) -> Vec<Vec<&str>> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    for raw in data.lines() {
        let line = strip_prefix_field(raw);
        if line.starts_with("Commencing") {
            buffer = vec![line];
        } else if line.starts_with("Instance") || line.starts_with("Summary") {
            buffer.push(line);
        } else if line.starts_with("Concluding") {
            buffer.push(line);
            chunks.push(std::mem::take(&mut buffer));
        }
    }
    chunks
}

/// Drops the fixed-width timestamp field and surrounding whitespace.
///
/// Lines that never reach the payload column are treated as empty, counted in
/// characters to match the source log's code-point slicing.
fn strip_prefix_field(line: &str) -> &str {
    match line.char_indices().nth(LINE_PREFIX_WIDTH) {
        Some((offset, _)) => line[offset..].trim(),
        None => "",
    }
}

/// Parses one `Commencing…Concluding` chunk into an [`Experiment`].
///
/// The first and last lines must both match the marker grammar and agree on
/// the `(story, sentence, character)` triple. Interior lines re-segment into
/// instance chunks, each closed by its `Summary` line; interior lines after
/// the last `Summary` are dropped.
pub fn parse_experiment(lines: &[&str], detail_dir: &Path) -> Result<Experiment> {
    let commencing = marker_captures(lines.first().copied().unwrap_or(""))?;
    let concluding = marker_captures(lines.last().copied().unwrap_or(""))?;
    if commencing != concluding {
        return Err(IngestError::MarkerMismatch {
            commencing: commencing.join(", "),
            concluding: concluding.join(", "),
        });
    }

    let interior: &[&str] = if lines.len() > 1 {
        &lines[1..lines.len() - 1]
    } else {
        &[]
    };
    let mut instances = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    for &line in interior {
        buffer.push(line);
        if line.starts_with("Summary") {
            instances.push(parse_instance(&std::mem::take(&mut buffer), detail_dir)?);
        }
    }

    let [story, sentence, character] = commencing;
    Ok(Experiment {
        story: Uuid::parse_str(story)?,
        sentence: sentence.parse()?,
        character: character.to_string(),
        instances,
    })
}

fn marker_captures(line: &str) -> Result<[&str; 3]> {
    let captures = EXPERIMENT_MARKER
        .captures(line)
        .ok_or_else(|| IngestError::Parse {
            kind: RecordKind::Experiment,
            line: line.to_string(),
        })?;
    Ok([
        captures.get(1).map_or("", |m| m.as_str()),
        captures.get(2).map_or("", |m| m.as_str()),
        captures.get(3).map_or("", |m| m.as_str()),
    ])
}

/// Parses one instance chunk: sample lines followed by the `Summary` header
/// that closed the chunk.
///
/// The declared sizes are not checked against the number of sample lines;
/// each sample validates its own path counts.
pub fn parse_instance(lines: &[&str], detail_dir: &Path) -> Result<Instance> {
    let header = lines.last().copied().unwrap_or("");
    let captures = INSTANCE_HEADER
        .captures(header)
        .ok_or_else(|| IngestError::Parse {
            kind: RecordKind::Instance,
            line: header.to_string(),
        })?;
    let human_size: usize = captures.get(1).map_or("", |m| m.as_str()).parse()?;
    let machine_size: usize = captures.get(2).map_or("", |m| m.as_str()).parse()?;

    let mut samples = Vec::new();
    for &line in &lines[..lines.len().saturating_sub(1)] {
        samples.push(parse_sample(line, detail_dir)?);
    }

    Ok(Instance {
        human_size,
        machine_size,
        samples,
    })
}

/// One per-sample detail document as written by the generation run.
#[derive(Deserialize)]
struct DetailFile {
    reasons: Vec<(f64, String)>,
    entropy: f64,
    target: String,
    result: Vec<f64>,
}

/// Parses one sample line, loading `<identifier>.json` from `detail_dir`.
///
/// The detail document's `reasons` list must be exactly as long as the size
/// pair declared on the line; the first `human_size` entries become the human
/// paths and the remainder the machine paths, order preserved.
pub fn parse_sample(line: &str, detail_dir: &Path) -> Result<Sample> {
    let captures = SAMPLE_LINE
        .captures(line)
        .ok_or_else(|| IngestError::Parse {
            kind: RecordKind::Sample,
            line: line.to_string(),
        })?;
    let id = captures.get(1).map_or("", |m| m.as_str());
    let human_size: usize = captures.get(2).map_or("", |m| m.as_str()).parse()?;
    let machine_size: usize = captures.get(3).map_or("", |m| m.as_str()).parse()?;

    let detail: DetailFile =
        serde_json::from_slice(&fs::read(detail_dir.join(format!("{id}.json")))?)?;

    if detail.reasons.len() != human_size + machine_size {
        return Err(IngestError::ReasonCount {
            found: detail.reasons.len(),
            declared: human_size + machine_size,
        });
    }

    let mut human_paths: Vec<ReasonPath> = detail
        .reasons
        .into_iter()
        .map(|(weight, content)| ReasonPath { weight, content })
        .collect();
    let machine_paths = human_paths.split_off(human_size);

    Ok(Sample {
        error: detail.entropy,
        target: parse_target(&detail.target)?,
        result: detail.result,
        human_paths,
        machine_paths,
    })
}

/// Strips the assumed bracket delimiters from a target field and splits the
/// remainder on commas.
///
/// The delimiters are not verified; anything that then fails integer
/// conversion propagates as-is.
fn parse_target(field: &str) -> Result<Vec<i64>> {
    let mut inner = field.chars();
    inner.next();
    inner.next_back();
    inner
        .as_str()
        .split(',')
        .map(|piece| piece.trim().parse::<i64>().map_err(IngestError::from))
        .collect()
}
