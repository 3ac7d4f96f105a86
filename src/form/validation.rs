//! Field validators
//!
//! A fixed, process-wide table mapping external field names to validation
//! predicates. Fields without an entry fall back to [`required`].

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Shape of a canonical identifier (lowercase 8-4-4-4-12 hex UUID)
pub const CANONICAL_ID_PATTERN: &str =
    r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";

/// Validation predicate over a single answer
pub type Validator = fn(&str) -> Result<(), ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("invalid cert id")]
    InvalidCertId,
    #[error("invalid file")]
    InvalidFile,
    #[error("required")]
    Required,
}

lazy_static! {
    static ref API_KEY_RE: Regex =
        Regex::new(r"^[0-9a-f]{32}$").expect("Invalid api key regex");
    static ref CERT_ID_RE: Regex = Regex::new(&format!("^{}$", CANONICAL_ID_PATTERN))
        .expect("Invalid cert id regex");
    static ref VALIDATORS: HashMap<&'static str, Validator> = {
        let mut m: HashMap<&'static str, Validator> = HashMap::new();
        m.insert("apiKey", api_key);
        m.insert("certId", cert_id);
        m.insert("certPath", file_exists);
        m.insert("profilePath", file_exists);
        m
    };
}

/// Look up the validator for a field, defaulting to [`required`]
pub fn lookup(field: &str) -> Validator {
    VALIDATORS.get(field).copied().unwrap_or(required)
}

/// Whether a field has a dedicated validator
pub fn is_registered(field: &str) -> bool {
    VALIDATORS.contains_key(field)
}

pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(())
}

/// 32 lowercase hex characters
pub fn api_key(value: &str) -> Result<(), ValidationError> {
    if API_KEY_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidApiKey)
    }
}

pub fn cert_id(value: &str) -> Result<(), ValidationError> {
    if CERT_ID_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCertId)
    }
}

/// Passes when anything exists at the given path
pub fn file_exists(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || std::fs::metadata(Path::new(value)).is_err() {
        return Err(ValidationError::InvalidFile);
    }
    Ok(())
}
