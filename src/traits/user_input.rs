use crate::form::validation::{ValidationError, Validator};
use crate::form::{Question, QuestionKind};
use anyhow::Result;
use inquire::validator::Validation;
use inquire::{CustomUserError, InquireError, Password, PasswordDisplayMode, Select, Text};
use std::collections::HashMap;
use thiserror::Error;

/// Answers keyed by question name
pub type Answers = HashMap<String, String>;

/// An answer rejected by its question's validator
#[derive(Debug, Error)]
#[error("{field}: {source}")]
pub struct InvalidAnswer {
    pub field: String,
    pub source: ValidationError,
}

/// The user cancelled (Esc) or interrupted (Ctrl-C) a prompt
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PromptCancelled(pub String);

/// Only cancellation is reported as `PromptCancelled`; anything else (no
/// terminal, bad prompt configuration, I/O) stays a plain failure
fn prompt_error(err: InquireError) -> anyhow::Error {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            PromptCancelled(err.to_string()).into()
        }
        other => anyhow::Error::new(other),
    }
}

/// Trait for user input operations to enable testing with mocks
pub trait UserInput: Send + Sync {
    /// Ask a batch of questions, returning one answer per question name
    fn ask(&self, questions: &[Question]) -> Result<Answers>;
}

/// Real user input implementation using inquire crate
pub struct InquireUserInput;

impl InquireUserInput {
    fn select(question: &Question, options: &[String], page_size: usize) -> Result<String> {
        loop {
            let answer = Select::new(&question.name, options.to_vec())
                .with_page_size(page_size)
                .prompt()
                .map_err(prompt_error)?;

            match question.validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(err) => crate::output::error(&err.to_string()),
            }
        }
    }
}

fn answer_validator(
    validator: Validator,
) -> impl Fn(&str) -> Result<Validation, CustomUserError> + Clone {
    move |input: &str| match validator(input) {
        Ok(()) => Ok(Validation::Valid),
        Err(err) => Ok(Validation::Invalid(err.to_string().into())),
    }
}

impl UserInput for InquireUserInput {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        let mut answers = Answers::new();

        for question in questions {
            let answer = match &question.kind {
                QuestionKind::Text { .. } => Text::new(question.message())
                    .with_validator(answer_validator(question.validator))
                    .prompt()
                    .map_err(prompt_error)?,
                QuestionKind::Password { .. } => Password::new(question.message())
                    .without_confirmation()
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .with_validator(answer_validator(question.validator))
                    .prompt()
                    .map_err(prompt_error)?,
                QuestionKind::Select { options, page_size } => {
                    Self::select(question, options, *page_size)?
                }
            };
            answers.insert(question.name.clone(), answer);
        }

        Ok(answers)
    }
}

/// Mock user input implementation for testing
#[cfg(test)]
pub struct MockUserInput {
    answers: std::sync::Mutex<HashMap<String, String>>,
    batches: std::sync::Mutex<Vec<Vec<Question>>>,
    abort: Option<String>,
    failure: Option<String>,
}

#[cfg(test)]
impl MockUserInput {
    /// Create new mock with no pre-configured answers
    pub fn new() -> Self {
        Self {
            answers: std::sync::Mutex::new(HashMap::new()),
            batches: std::sync::Mutex::new(Vec::new()),
            abort: None,
            failure: None,
        }
    }

    /// Create mock with pre-configured answers by question name
    pub fn with_answers(answers: &[(&str, &str)]) -> Self {
        let mock = Self::new();
        for (name, value) in answers {
            mock.add_answer(name, value);
        }
        mock
    }

    /// Create a mock that fails every batch, as if the user cancelled
    pub fn aborting(reason: &str) -> Self {
        Self {
            abort: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Create a mock whose prompts cannot be shown at all
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn add_answer(&self, name: &str, value: &str) {
        self.answers
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    /// Every batch asked so far
    pub fn batches(&self) -> Vec<Vec<Question>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn ask_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[cfg(test)]
impl Default for MockUserInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl UserInput for MockUserInput {
    fn ask(&self, questions: &[Question]) -> Result<Answers> {
        self.batches.lock().unwrap().push(questions.to_vec());

        if let Some(reason) = &self.abort {
            return Err(PromptCancelled(reason.clone()).into());
        }
        if let Some(reason) = &self.failure {
            anyhow::bail!("{}", reason);
        }

        let canned = self.answers.lock().unwrap();
        let mut answers = Answers::new();

        for question in questions {
            let answer = canned
                .get(&question.name)
                .ok_or_else(|| anyhow::anyhow!("No mock answer for '{}'", question.name))?;

            if let QuestionKind::Select { options, .. } = &question.kind
                && !options.contains(answer)
            {
                anyhow::bail!(
                    "Mock answer '{}' is not in the provided options: {:?}",
                    answer,
                    options
                );
            }

            question.validate(answer).map_err(|source| InvalidAnswer {
                field: question.name.clone(),
                source,
            })?;

            answers.insert(question.name.clone(), answer.clone());
        }

        Ok(answers)
    }
}
