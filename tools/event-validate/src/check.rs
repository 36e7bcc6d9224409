//! Payload discovery and decoding.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gamification_events::{decode, DecodeError, GamificationEvent};
use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Collects the payload files under `paths`, sorted.
///
/// A path naming a file is taken as is; directories contribute their `.json`
/// files at any depth.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        for entry in WalkDir::new(root) {
            let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.depth() == 0 || is_json(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

/// Where a payload sits inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The file holds a single payload, or could not be parsed at all.
    Whole,
    /// Element of a top-level array.
    Index(usize),
}

/// Decode result for one payload.
#[derive(Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub position: Position,
    pub result: Result<GamificationEvent, DecodeError>,
}

impl Outcome {
    fn new(
        path: &Path,
        position: Position,
        result: Result<GamificationEvent, DecodeError>,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            position,
            result,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match self.position {
            Position::Whole => self.path.display().to_string(),
            Position::Index(index) => format!("{}[{}]", self.path.display(), index),
        };
        match &self.result {
            Ok(event) => write!(
                f,
                "OK   {location} {} {}",
                event.event_type(),
                event.event_id()
            ),
            Err(err) => write!(f, "FAIL {location}: {err}"),
        }
    }
}

/// Reads one file and decodes every payload in it.
///
/// A file that is not valid JSON yields a single rejected outcome; only
/// I/O failures are errors.
pub fn check_file(path: &Path) -> Result<Vec<Outcome>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let outcome = |position, result| Outcome::new(path, position, result);

    let value: Value = match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(err) => return Ok(vec![outcome(Position::Whole, Err(err.into()))]),
    };

    let outcomes = match value {
        Value::Array(payloads) => payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| outcome(Position::Index(index), decode(payload)))
            .collect(),
        payload => vec![outcome(Position::Whole, decode(&payload))],
    };

    debug!(path = %path.display(), payloads = outcomes.len(), "checked file");
    Ok(outcomes)
}

/// Totals over a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        if outcome.is_accepted() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.accepted + self.rejected
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} payloads in {} files: {} accepted, {} rejected",
            self.total(),
            self.files,
            self.accepted,
            self.rejected
        )
    }
}

/// Checks every payload under `paths`, passing each outcome to `report`.
pub fn run(paths: &[PathBuf], mut report: impl FnMut(&Outcome)) -> Result<Summary> {
    let files = collect_files(paths)?;
    info!(files = files.len(), "validating payload files");

    let mut summary = Summary {
        files: files.len(),
        ..Summary::default()
    };
    for path in &files {
        for outcome in check_file(path)? {
            summary.record(&outcome);
            report(&outcome);
        }
    }
    Ok(summary)
}
