//! Two-phase record population
//!
//! Commands fill their record in two ordered passes. The global pass covers
//! fields shared by every command (API key, organization id) so an
//! authenticated service can be built from them. The command pass then covers
//! the remaining fields, using that service to offer identifier choices.
//!
//! In both passes a non-empty flag value is assigned as-is, without
//! validation. Every other field becomes a question, and all questions of a
//! pass are asked in one batch. A pass only writes to the record once it has
//! fully succeeded.

use super::descriptor::{FieldDescriptor, FlagSet, PromptType, Record};
use super::error::PopulateError;
use super::question::Question;
use super::resolver::{self, CandidateSource};
use crate::traits::{InvalidAnswer, PromptCancelled, UserInput};

/// Fields that are always populated by the global pass
pub const RESERVED_GLOBAL_FIELDS: [&str; 2] = ["orgId", "apiKey"];

pub struct Populator<'a> {
    input: &'a dyn UserInput,
}

impl<'a> Populator<'a> {
    pub fn new(input: &'a dyn UserInput) -> Self {
        Self { input }
    }

    /// Populate the global fields of `record`
    pub fn populate_global(&self, flags: &FlagSet, record: &mut Record) -> Result<(), PopulateError> {
        let mut staged = record.clone();
        let mut questions = Vec::new();

        for descriptor in record.descriptors().iter().filter(|d| d.is_global) {
            if assign_from_flag(flags, descriptor, &mut staged) {
                continue;
            }
            questions.push(Question::for_field(descriptor));
        }

        self.ask(&questions, &mut staged)?;
        *record = staged;
        Ok(())
    }

    /// Populate the command-specific fields of `record`.
    ///
    /// `source` supplies candidates for identifier-selection fields; it is only
    /// consulted for fields that actually need prompting.
    pub fn populate(
        &self,
        flags: &FlagSet,
        record: &mut Record,
        source: Option<&dyn CandidateSource>,
    ) -> Result<(), PopulateError> {
        let descriptors: Vec<FieldDescriptor> = record
            .descriptors()
            .into_iter()
            .filter(|d| !d.is_global && !RESERVED_GLOBAL_FIELDS.contains(&d.external_name))
            .collect();

        let mut staged = record.clone();
        let mut questions = Vec::new();

        for descriptor in &descriptors {
            if assign_from_flag(flags, descriptor, &mut staged) {
                continue;
            }

            let question = match descriptor.prompt_type {
                PromptType::IdentifierSelect => select_question(descriptor, source)?,
                _ => Question::for_field(descriptor),
            };
            questions.push(question);
        }

        self.ask(&questions, &mut staged)?;

        for descriptor in descriptors
            .iter()
            .filter(|d| d.prompt_type == PromptType::IdentifierSelect)
        {
            let name = descriptor.external_name;
            let Some(value) = staged.get(name).map(str::to_string) else { continue };
            match resolver::extract_canonical_id(&value) {
                Some(canonical) => {
                    staged.set(name, canonical);
                }
                // A rendered option must carry its identifier
                None if resolver::is_decorated(&value) => {
                    return Err(PopulateError::ValidationFailed {
                        field: name.to_string(),
                        reason: format!("no identifier in '{}'", value),
                    });
                }
                None => {}
            }
        }

        tracing::debug!(
            populated = ?staged
                .iter()
                .filter(|(_, value)| value.is_some())
                .map(|(name, _)| name)
                .collect::<Vec<_>>(),
            "command pass complete"
        );
        *record = staged;
        Ok(())
    }

    fn ask(&self, questions: &[Question], staged: &mut Record) -> Result<(), PopulateError> {
        if questions.is_empty() {
            tracing::debug!("all fields satisfied, skipping prompt");
            return Ok(());
        }

        tracing::debug!(count = questions.len(), "prompting for fields");
        let answers = self.input.ask(questions).map_err(classify_prompt_error)?;

        for question in questions {
            let answer = answers.get(&question.name).ok_or_else(|| {
                PopulateError::PromptAborted(format!("no answer for '{}'", question.name))
            })?;
            staged.set(&question.name, answer.clone());
        }

        Ok(())
    }
}

fn assign_from_flag(flags: &FlagSet, descriptor: &FieldDescriptor, staged: &mut Record) -> bool {
    match flags.get(descriptor.external_name) {
        Some(value) if !value.is_empty() => {
            tracing::debug!(field = descriptor.external_name, "assigned from flag");
            staged.set(descriptor.external_name, value.clone());
            true
        }
        _ => false,
    }
}

fn select_question(
    descriptor: &FieldDescriptor,
    source: Option<&dyn CandidateSource>,
) -> Result<Question, PopulateError> {
    let field = descriptor.external_name;
    let source = source.ok_or_else(|| PopulateError::RemoteFetchFailed {
        field: field.to_string(),
        reason: "no candidate source available".to_string(),
    })?;

    // No manual-entry fallback: a failed fetch aborts the command.
    resolver::build_select(field, source).map_err(|err| {
        if err.downcast_ref::<resolver::NoCandidates>().is_some() {
            PopulateError::NoCandidates {
                field: field.to_string(),
            }
        } else {
            PopulateError::RemoteFetchFailed {
                field: field.to_string(),
                reason: format!("{:#}", err),
            }
        }
    })
}

fn classify_prompt_error(err: anyhow::Error) -> PopulateError {
    if let Some(invalid) = err.downcast_ref::<InvalidAnswer>() {
        return PopulateError::ValidationFailed {
            field: invalid.field.clone(),
            reason: invalid.source.to_string(),
        };
    }
    if err.downcast_ref::<PromptCancelled>().is_some() {
        return PopulateError::PromptAborted(format!("{:#}", err));
    }
    PopulateError::PromptFailed(format!("{:#}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::descriptor::FieldSpec;
    use crate::form::question::QuestionKind;
    use crate::form::resolver::Candidate;
    use crate::traits::MockUserInput;
    use anyhow::{Result, bail};
    use std::cell::Cell;

    const KEY: &str = "0123456789abcdef0123456789abcdef";
    const PROD_ID: &str = "11111111-2222-3333-4444-555555555555";

    const GET_CRED: &[FieldSpec] = &[
        FieldSpec::new("ApiKey").named("apiKey").global(),
        FieldSpec::new("OrgId").named("orgId").global(),
        FieldSpec::new("CredId")
            .named("credId")
            .prompt(PromptType::IdentifierSelect),
    ];

    const UPLOAD_CRED: &[FieldSpec] = &[
        FieldSpec::new("ApiKey").named("apiKey").global(),
        FieldSpec::new("OrgId").named("orgId").global(),
        FieldSpec::new("Label").named("label"),
        FieldSpec::new("CertPath")
            .named("certPath")
            .prompt(PromptType::FilePath),
        FieldSpec::new("CertPass")
            .named("certPass")
            .prompt(PromptType::Password),
    ];

    // orgId/apiKey declared without the global marker
    const MISDECLARED: &[FieldSpec] = &[
        FieldSpec::new("ApiKey").named("apiKey"),
        FieldSpec::new("OrgId").named("orgId"),
        FieldSpec::new("Label").named("label"),
    ];

    struct FakeCredentials {
        candidates: Vec<Candidate>,
        fetches: Cell<usize>,
    }

    impl FakeCredentials {
        fn new() -> Self {
            Self {
                candidates: vec![
                    Candidate::new("Prod", PROD_ID),
                    Candidate::new("Dev", "66666666-7777-8888-9999-000000000000"),
                ],
                fetches: Cell::new(0),
            }
        }
    }

    impl CandidateSource for FakeCredentials {
        fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.candidates.clone())
        }
    }

    struct Unreachable;

    impl CandidateSource for Unreachable {
        fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
            bail!("connection refused")
        }
    }

    fn flags(pairs: &[(&str, &str)]) -> FlagSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_credential_scenario() {
        let input = MockUserInput::with_answers(&[("credId", format!("Prod {{{}}}", PROD_ID).as_str())]);
        let populator = Populator::new(&input);
        let flags = flags(&[("apiKey", KEY), ("orgId", "org1"), ("credId", "")]);
        let service = FakeCredentials::new();
        let mut record = Record::new(GET_CRED);

        populator.populate_global(&flags, &mut record).unwrap();
        assert_eq!(record.get("apiKey"), Some(KEY));
        assert_eq!(record.get("orgId"), Some("org1"));
        assert_eq!(input.ask_count(), 0);

        populator.populate(&flags, &mut record, Some(&service)).unwrap();
        assert_eq!(record.get("credId"), Some(PROD_ID));
        assert_eq!(service.fetches.get(), 1);

        let batches = input.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        match &batches[0][0].kind {
            QuestionKind::Select { options, page_size } => {
                assert_eq!(*page_size, 10);
                assert_eq!(options.len(), 2);
            }
            other => panic!("expected select question, got {:?}", other),
        }
    }

    #[test]
    fn test_flag_values_are_assigned_without_prompting_or_validation() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let flags = flags(&[
            ("apiKey", "not-a-valid-key"),
            ("orgId", "org1"),
            ("label", "Prod"),
            ("certPath", "/no/such/file.p12"),
            ("certPass", "secret"),
        ]);
        let mut record = Record::new(UPLOAD_CRED);

        populator.populate_global(&flags, &mut record).unwrap();
        populator.populate(&flags, &mut record, None).unwrap();

        assert_eq!(input.ask_count(), 0);
        assert_eq!(record.get("apiKey"), Some("not-a-valid-key"));
        assert_eq!(record.get("certPath"), Some("/no/such/file.p12"));
        assert_eq!(record.get("certPass"), Some("secret"));
    }

    #[test]
    fn test_one_question_per_missing_field() {
        let input = MockUserInput::with_answers(&[("apiKey", KEY), ("orgId", "org1"), ("label", "Prod")]);
        let populator = Populator::new(&input);
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let flags = flags(&[("certPath", path.as_str()), ("certPass", "pw")]);
        let mut record = Record::new(UPLOAD_CRED);

        populator.populate_global(&flags, &mut record).unwrap();
        populator.populate(&flags, &mut record, None).unwrap();

        let batches = input.batches();
        assert_eq!(batches.len(), 2);
        let global: Vec<_> = batches[0].iter().map(|q| q.name.as_str()).collect();
        assert_eq!(global, vec!["apiKey", "orgId"]);
        let command: Vec<_> = batches[1].iter().map(|q| q.name.as_str()).collect();
        assert_eq!(command, vec!["label"]);

        assert_eq!(record.get("apiKey"), Some(KEY));
        assert_eq!(record.get("label"), Some("Prod"));
        assert_eq!(record.get("certPath"), Some(path.as_str()));
    }

    #[test]
    fn test_prompt_kinds_follow_prompt_type() {
        let input = MockUserInput::with_answers(&[("label", "Prod"), ("certPass", "pw")]);
        let file = tempfile::NamedTempFile::new().unwrap();
        input.add_answer("certPath", file.path().to_str().unwrap());
        let populator = Populator::new(&input);
        let mut record = Record::new(UPLOAD_CRED);

        populator.populate(&FlagSet::new(), &mut record, None).unwrap();

        let batch = &input.batches()[0];
        assert!(matches!(batch[0].kind, QuestionKind::Text { .. }));
        assert_eq!(
            batch[1].kind,
            QuestionKind::Text {
                message: "certPath (absolute path, can drag and drop)".to_string()
            }
        );
        assert!(matches!(batch[2].kind, QuestionKind::Password { .. }));
    }

    #[test]
    fn test_reserved_fields_never_prompted_in_command_pass() {
        let input = MockUserInput::with_answers(&[("label", "Prod")]);
        let populator = Populator::new(&input);
        let mut record = Record::new(MISDECLARED);

        populator.populate(&FlagSet::new(), &mut record, None).unwrap();

        let names: Vec<_> = input.batches()[0].iter().map(|q| q.name.clone()).collect();
        assert_eq!(names, vec!["label".to_string()]);
        assert!(record.get("apiKey").is_none());
        assert!(record.get("orgId").is_none());
    }

    #[test]
    fn test_empty_batch_does_not_invoke_prompt() {
        const LIST_CREDS: &[FieldSpec] = &[
            FieldSpec::new("ApiKey").named("apiKey").global(),
            FieldSpec::new("OrgId").named("orgId").global(),
        ];
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let mut record = Record::new(LIST_CREDS);
        let flags = flags(&[("apiKey", KEY), ("orgId", "org1")]);

        populator.populate_global(&flags, &mut record).unwrap();
        populator.populate(&flags, &mut record, None).unwrap();
        assert_eq!(input.ask_count(), 0);
    }

    #[test]
    fn test_remote_fetch_failure_aborts_without_partial_writes() {
        let input = MockUserInput::with_answers(&[("label", "Prod")]);
        let populator = Populator::new(&input);
        const SHAPE: &[FieldSpec] = &[
            FieldSpec::new("label"),
            FieldSpec::new("certId").prompt(PromptType::IdentifierSelect),
            FieldSpec::new("note"),
        ];
        let flags = flags(&[("note", "from flag")]);
        let mut record = Record::new(SHAPE);

        let err = populator
            .populate(&flags, &mut record, Some(&Unreachable))
            .unwrap_err();

        match err {
            PopulateError::RemoteFetchFailed { field, reason } => {
                assert_eq!(field, "certId");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected RemoteFetchFailed, got {:?}", other),
        }
        assert_eq!(input.ask_count(), 0);
        assert!(record.iter().all(|(_, value)| value.is_none()));
    }

    #[test]
    fn test_missing_candidate_source_is_a_fetch_failure() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let mut record = Record::new(GET_CRED);

        let err = populator
            .populate(&FlagSet::new(), &mut record, None)
            .unwrap_err();
        assert!(matches!(err, PopulateError::RemoteFetchFailed { .. }));
    }

    #[test]
    fn test_identifier_flag_skips_fetch_and_is_normalized() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let service = FakeCredentials::new();
        let flags = flags(&[("credId", format!("Prod {{{}}}", PROD_ID).as_str())]);
        let mut record = Record::new(GET_CRED);

        populator.populate(&flags, &mut record, Some(&service)).unwrap();

        assert_eq!(service.fetches.get(), 0);
        assert_eq!(record.get("credId"), Some(PROD_ID));
    }

    #[test]
    fn test_identifier_flag_without_uuid_kept_verbatim() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let flags = flags(&[("credId", "legacy-id")]);
        let mut record = Record::new(GET_CRED);

        populator.populate(&flags, &mut record, None).unwrap();
        assert_eq!(record.get("credId"), Some("legacy-id"));
    }

    #[test]
    fn test_global_prompt_abort_leaves_record_empty() {
        let input = MockUserInput::aborting("operation canceled by user");
        let populator = Populator::new(&input);
        let flags = flags(&[("orgId", "org1")]);
        let mut record = Record::new(GET_CRED);

        let err = populator.populate_global(&flags, &mut record).unwrap_err();
        match err {
            PopulateError::PromptAborted(reason) => assert!(reason.contains("canceled")),
            other => panic!("expected PromptAborted, got {:?}", other),
        }
        assert!(record.get("orgId").is_none());
    }

    #[test]
    fn test_prompt_failure_is_not_an_abort() {
        let input = MockUserInput::failing("The input device is not a TTY");
        let populator = Populator::new(&input);
        const SHAPE: &[FieldSpec] = &[FieldSpec::new("label")];
        let mut record = Record::new(SHAPE);

        let err = populator
            .populate(&FlagSet::new(), &mut record, None)
            .unwrap_err();
        match err {
            PopulateError::PromptFailed(reason) => assert!(reason.contains("not a TTY")),
            other => panic!("expected PromptFailed, got {:?}", other),
        }
        assert!(record.get("label").is_none());
    }

    #[test]
    fn test_empty_candidate_list_fails_before_prompting() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let service = FakeCredentials {
            candidates: Vec::new(),
            fetches: Cell::new(0),
        };
        let mut record = Record::new(GET_CRED);

        let err = populator
            .populate(&FlagSet::new(), &mut record, Some(&service))
            .unwrap_err();
        match err {
            PopulateError::NoCandidates { field } => assert_eq!(field, "credId"),
            other => panic!("expected NoCandidates, got {:?}", other),
        }
        assert_eq!(input.ask_count(), 0);
    }

    #[test]
    fn test_decorated_identifier_without_uuid_is_rejected() {
        let input = MockUserInput::new();
        let populator = Populator::new(&input);
        let flags = flags(&[("credId", "Prod {not-a-uuid}"), ("orgId", "org1")]);
        let mut record = Record::new(GET_CRED);

        let err = populator.populate(&flags, &mut record, None).unwrap_err();
        match err {
            PopulateError::ValidationFailed { field, .. } => assert_eq!(field, "credId"),
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
        assert!(record.get("credId").is_none());
    }

    #[test]
    fn test_invalid_answer_is_validation_failure() {
        let input = MockUserInput::with_answers(&[("apiKey", "ABC"), ("orgId", "org1")]);
        let populator = Populator::new(&input);
        let mut record = Record::new(GET_CRED);

        let err = populator
            .populate_global(&FlagSet::new(), &mut record)
            .unwrap_err();
        match err {
            PopulateError::ValidationFailed { field, reason } => {
                assert_eq!(field, "apiKey");
                assert_eq!(reason, "invalid api key");
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }
}
