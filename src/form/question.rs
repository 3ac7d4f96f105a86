use super::descriptor::{FieldDescriptor, PromptType};
use super::resolver;
use super::validation::{self, ValidationError, Validator};

/// How a question is rendered by the prompting primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    Text { message: String },
    Password { message: String },
    Select { options: Vec<String>, page_size: usize },
}

/// A single pending prompt for one unsatisfied field
#[derive(Debug, Clone)]
pub struct Question {
    pub name: String,
    pub kind: QuestionKind,
    pub validator: Validator,
}

impl Question {
    pub fn new(name: impl Into<String>, kind: QuestionKind, validator: Validator) -> Self {
        Self {
            name: name.into(),
            kind,
            validator,
        }
    }

    /// Build the question for a field that prompts for free input.
    ///
    /// Identifier-selection fields need remote candidates and are built by
    /// [`resolver::build_select`] instead.
    pub fn for_field(descriptor: &FieldDescriptor) -> Self {
        let name = descriptor.external_name;
        let kind = match descriptor.prompt_type {
            PromptType::Password => QuestionKind::Password {
                message: name.to_string(),
            },
            PromptType::FilePath => QuestionKind::Text {
                message: format!("{} (absolute path, can drag and drop)", name),
            },
            PromptType::Plain | PromptType::IdentifierSelect => QuestionKind::Text {
                message: name.to_string(),
            },
        };

        Self::new(name, kind, validation::lookup(name))
    }

    /// Prompt message shown to the user
    pub fn message(&self) -> &str {
        match &self.kind {
            QuestionKind::Text { message } | QuestionKind::Password { message } => message,
            QuestionKind::Select { .. } => &self.name,
        }
    }

    /// Validate an answer. Selection answers are checked on the identifier
    /// they carry, not on the decorated label.
    pub fn validate(&self, answer: &str) -> Result<(), ValidationError> {
        match self.kind {
            QuestionKind::Select { .. } => {
                (self.validator)(resolver::extract_canonical_id(answer).unwrap_or(""))
            }
            _ => (self.validator)(answer),
        }
    }
}
