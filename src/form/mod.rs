//! Dynamic form population
//!
//! Turns a command's static field table plus the flags it was invoked with into
//! a fully populated record, prompting only for what is missing.

pub mod descriptor;
pub mod error;
pub mod populator;
pub mod question;
pub mod resolver;
pub mod validation;

pub use descriptor::{FieldSpec, FlagSet, PromptType, Record};
pub use error::PopulateError;
pub use populator::Populator;
pub use question::{Question, QuestionKind};
pub use resolver::{Candidate, CandidateSource};
