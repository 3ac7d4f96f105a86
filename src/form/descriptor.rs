//! Field descriptors and the per-invocation result record
//!
//! Every command declares its record shape as a static `FieldSpec` table. The
//! table plays the role of struct annotations: it carries the external name a
//! field is known by (flag name, prompt name), whether the field is shared by
//! all commands, and how it should be prompted for.

use super::validation;
use anyhow::{Result, bail};
use std::collections::BTreeMap;

/// Values supplied on the command line (or merged in from settings), keyed by
/// external field name
pub type FlagSet = BTreeMap<String, String>;

/// How a field is prompted for when no flag supplies it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    Plain,
    Password,
    FilePath,
    IdentifierSelect,
}

/// One entry of a record shape table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub external: Option<&'static str>,
    pub global: bool,
    pub prompt: PromptType,
}

impl FieldSpec {
    /// A plain, command-scoped field known by its raw name
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            external: None,
            global: false,
            prompt: PromptType::Plain,
        }
    }

    /// Expose the field under a different external name
    pub const fn named(mut self, external: &'static str) -> Self {
        self.external = Some(external);
        self
    }

    /// Mark the field as shared across every command
    pub const fn global(mut self) -> Self {
        self.global = true;
        self
    }

    pub const fn prompt(mut self, prompt: PromptType) -> Self {
        self.prompt = prompt;
        self
    }

    /// Name used for flags, prompts and record lookups
    pub fn external_name(&self) -> &'static str {
        self.external.unwrap_or(self.field)
    }
}

/// Everything the populator needs to know about a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub external_name: &'static str,
    pub is_global: bool,
    pub prompt_type: PromptType,
    pub has_registered_validator: bool,
}

/// Derive descriptors from a record shape, in declaration order
pub fn extract(shape: &[FieldSpec]) -> Vec<FieldDescriptor> {
    shape
        .iter()
        .map(|spec| {
            let external_name = spec.external_name();
            FieldDescriptor {
                external_name,
                is_global: spec.global,
                prompt_type: spec.prompt,
                has_registered_validator: validation::is_registered(external_name),
            }
        })
        .collect()
}

/// Ordered field → value container for one command invocation
#[derive(Debug, Clone)]
pub struct Record {
    shape: &'static [FieldSpec],
    values: Vec<Option<String>>,
}

impl Record {
    /// Create an empty record for the given shape
    pub fn new(shape: &'static [FieldSpec]) -> Self {
        Self {
            shape,
            values: vec![None; shape.len()],
        }
    }

    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        extract(self.shape)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.shape
            .iter()
            .position(|spec| spec.external_name() == name)
    }

    /// Get a field value by external name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|index| self.values[index].as_deref())
    }

    /// Set a field value by external name. Returns false for unknown fields.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.position(name) {
            Some(index) => {
                self.values[index] = Some(value.into());
                true
            }
            None => false,
        }
    }

    /// Get a field value, failing if it was never populated
    pub fn require(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(value) => Ok(value),
            None => bail!("Field '{}' has not been populated", name),
        }
    }

    /// Iterate fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.shape
            .iter()
            .zip(self.values.iter())
            .map(|(spec, value)| (spec.external_name(), value.as_deref()))
    }
}
