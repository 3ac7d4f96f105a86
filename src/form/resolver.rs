//! Remote choice resolution for identifier-selection fields
//!
//! Identifier fields are not typed by hand: their candidates are fetched from
//! the API and offered as a single-select list, rendered as `label {id}`. Once
//! answered, only the canonical identifier is kept.

use super::question::{Question, QuestionKind};
use super::validation::{self, CANONICAL_ID_PATTERN};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Number of options shown at once in a selection list
pub const SELECT_PAGE_SIZE: usize = 10;

lazy_static! {
    static ref CANONICAL_ID_RE: Regex =
        Regex::new(CANONICAL_ID_PATTERN).expect("Invalid canonical id regex");
    static ref DECORATED_RE: Regex = Regex::new(r"\{[^{}]*\}\s*$").expect("Invalid option regex");
}

/// The source answered, but with nothing to choose from
#[derive(Debug, Error)]
#[error("no choices available for '{field}'")]
pub struct NoCandidates {
    pub field: String,
}

/// A selectable remote entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub canonical_id: String,
}

impl Candidate {
    pub fn new(label: impl Into<String>, canonical_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            canonical_id: canonical_id.into(),
        }
    }

    /// Render as a list option: `<label> {<canonical_id>}`
    pub fn render(&self) -> String {
        format!("{} {{{}}}", self.label, self.canonical_id)
    }
}

/// Anything able to list candidates for an identifier-selection field
pub trait CandidateSource {
    fn fetch_candidates(&self) -> Result<Vec<Candidate>>;
}

/// Fetch candidates and build the selection question for `field`
pub fn build_select(field: &str, source: &dyn CandidateSource) -> Result<Question> {
    let candidates = source.fetch_candidates()?;
    tracing::debug!(field, count = candidates.len(), "fetched selection candidates");
    if candidates.is_empty() {
        return Err(NoCandidates {
            field: field.to_string(),
        }
        .into());
    }

    let options = candidates.iter().map(Candidate::render).collect();

    Ok(Question::new(
        field,
        QuestionKind::Select {
            options,
            page_size: SELECT_PAGE_SIZE,
        },
        validation::lookup(field),
    ))
}

/// Find the canonical identifier embedded in a rendered option
pub fn extract_canonical_id(text: &str) -> Option<&str> {
    CANONICAL_ID_RE.find(text).map(|m| m.as_str())
}

/// Whether `text` has the `label {id}` shape of a rendered option
pub fn is_decorated(text: &str) -> bool {
    DECORATED_RE.is_match(text)
}
