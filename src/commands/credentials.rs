use super::{API_KEY, ORG_ID, open_session, print_json};
use crate::cloudbuild::{CredentialUpload, CredentialsService};
use crate::context::Context;
use crate::form::{FieldSpec, FlagSet, Populator, PromptType, Record};
use anyhow::Result;

const GET_CRED: &[FieldSpec] = &[
    API_KEY,
    ORG_ID,
    FieldSpec::new("CredId")
        .named("credId")
        .prompt(PromptType::IdentifierSelect),
];

const LIST_CREDS: &[FieldSpec] = &[API_KEY, ORG_ID];

const UPDATE_CRED: &[FieldSpec] = &[
    API_KEY,
    ORG_ID,
    FieldSpec::new("CertId")
        .named("certId")
        .prompt(PromptType::IdentifierSelect),
    FieldSpec::new("Label").named("label"),
    FieldSpec::new("CertPath")
        .named("certPath")
        .prompt(PromptType::FilePath),
    FieldSpec::new("ProfilePath")
        .named("profilePath")
        .prompt(PromptType::FilePath),
    FieldSpec::new("CertPass")
        .named("certPass")
        .prompt(PromptType::Password),
];

const UPLOAD_CRED: &[FieldSpec] = &[
    API_KEY,
    ORG_ID,
    FieldSpec::new("Label").named("label"),
    FieldSpec::new("CertPath")
        .named("certPath")
        .prompt(PromptType::FilePath),
    FieldSpec::new("ProfilePath")
        .named("profilePath")
        .prompt(PromptType::FilePath),
    FieldSpec::new("CertPass")
        .named("certPass")
        .prompt(PromptType::Password),
];

const DELETE_CRED: &[FieldSpec] = &[
    API_KEY,
    ORG_ID,
    FieldSpec::new("CertId")
        .named("certId")
        .prompt(PromptType::IdentifierSelect),
];

/// Populate `shape` and return the record with a credentials service for its org
fn prepare(
    ctx: &Context,
    flags: &FlagSet,
    shape: &'static [FieldSpec],
) -> Result<(Record, CredentialsService)> {
    let mut record = Record::new(shape);
    let session = open_session(ctx, flags, &mut record)?;
    let service = CredentialsService::new(session.client, &session.org_id);

    Populator::new(ctx.input.as_ref()).populate(flags, &mut record, Some(&service))?;
    Ok((record, service))
}

fn upload_from(record: &Record) -> Result<CredentialUpload<'_>> {
    Ok(CredentialUpload {
        label: record.require("label")?,
        cert_path: record.require("certPath")?,
        profile_path: record.require("profilePath")?,
        cert_pass: record.require("certPass")?,
    })
}

pub struct GetCredCommand;

impl GetCredCommand {
    /// Show the details of one iOS credential
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let (record, service) = prepare(ctx, flags, GET_CRED)?;
        let cred = service.get_ios(record.require("credId")?)?;
        print_json(ctx, &cred)
    }
}

pub struct ListCredsCommand;

impl ListCredsCommand {
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let (_, service) = prepare(ctx, flags, LIST_CREDS)?;
        let creds = service.get_all_ios()?;
        print_json(ctx, &creds)
    }
}

pub struct UpdateCredCommand;

impl UpdateCredCommand {
    /// Replace the files and label of an existing credential
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let (record, service) = prepare(ctx, flags, UPDATE_CRED)?;
        let cred = service.update_ios(record.require("certId")?, upload_from(&record)?)?;
        print_json(ctx, &cred)
    }
}

pub struct UploadCredCommand;

impl UploadCredCommand {
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let (record, service) = prepare(ctx, flags, UPLOAD_CRED)?;
        let cred = service.upload_ios(upload_from(&record)?)?;
        print_json(ctx, &cred)
    }
}

pub struct DeleteCredCommand;

impl DeleteCredCommand {
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let (record, service) = prepare(ctx, flags, DELETE_CRED)?;
        let cert_id = record.require("certId")?;
        let status = service.delete_ios(cert_id)?;
        ctx.output
            .success(&format!("Deleted credential {} ({})", cert_id, status));
        Ok(())
    }
}
