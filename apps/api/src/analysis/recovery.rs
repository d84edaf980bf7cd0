//! Completion recovery: turns untrusted model output into an `AnalysisResult`.
//!
//! Strategies run in a fixed order and the first one whose candidate parses as
//! JSON wins. A winner that is not an object is an unexpected shape. There is
//! no lenient repair beyond the strategies in `TIERS`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::analysis::models::{json_kind, AnalysisResult};

#[derive(Debug, Error, PartialEq)]
pub enum RecoveryError {
    #[error("no recovery strategy produced parseable JSON")]
    MalformedCompletion,

    #[error("{0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    Direct,
    FencedBlock,
    BraceSpan,
}

impl fmt::Display for RecoveryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecoveryTier::Direct => "direct",
            RecoveryTier::FencedBlock => "fenced_block",
            RecoveryTier::BraceSpan => "brace_span",
        };
        f.write_str(name)
    }
}

/// Returns the substring a tier wants parsed, if it finds one.
type Locate = fn(&str) -> Option<&str>;

const TIERS: &[(RecoveryTier, Locate)] = &[
    (RecoveryTier::Direct, locate_whole),
    (RecoveryTier::FencedBlock, locate_fenced_block),
    (RecoveryTier::BraceSpan, locate_brace_span),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub result: AnalysisResult,
    pub tier: RecoveryTier,
}

/// Recovers an analysis from raw completion text.
pub fn recover(raw_text: &str) -> Result<Recovered, RecoveryError> {
    let (tier, object) = match recover_object(raw_text) {
        Ok(found) => found,
        Err(e) => {
            error!(raw_text = %raw_text, "Completion recovery failed: {e}");
            return Err(e);
        }
    };

    let result = AnalysisResult::from_object(object).map_err(|reason| {
        error!(raw_text = %raw_text, tier = %tier, "Recovered JSON has the wrong shape: {reason}");
        RecoveryError::UnexpectedShape(reason)
    })?;

    if tier == RecoveryTier::Direct {
        debug!("Completion parsed as pure JSON");
    } else {
        info!(tier = %tier, "Completion recovered by fallback strategy");
    }
    Ok(Recovered { result, tier })
}

/// Runs the tiers in order. The first candidate that parses as JSON wins its
/// tier; if that value is not an object no later tier is tried.
pub fn recover_object(raw_text: &str) -> Result<(RecoveryTier, Map<String, Value>), RecoveryError> {
    for &(tier, locate) in TIERS {
        let Some(candidate) = locate(raw_text) else {
            continue;
        };
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => return Ok((tier, object)),
            Ok(other) => {
                return Err(RecoveryError::UnexpectedShape(format!(
                    "completion parsed as {} via {tier}, expected an object",
                    json_kind(&other)
                )))
            }
            Err(e) => {
                warn!(tier = %tier, "Candidate is not valid JSON: {e}");
            }
        }
    }

    Err(RecoveryError::MalformedCompletion)
}

fn locate_whole(raw_text: &str) -> Option<&str> {
    Some(raw_text)
}

fn fenced_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"```json\s*(\{[\s\S]*?\})\s*```").expect("fenced block pattern is valid")
    })
}

fn locate_fenced_block(raw_text: &str) -> Option<&str> {
    fenced_block_pattern()
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn locate_brace_span(raw_text: &str) -> Option<&str> {
    let first = raw_text.find('{')?;
    let last = raw_text.rfind('}')?;
    (last > first).then(|| &raw_text[first..=last])
}
