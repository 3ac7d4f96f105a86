pub mod config;
pub mod credentials;
pub mod projects;

pub use config::ConfigCommand;
pub use credentials::{
    DeleteCredCommand, GetCredCommand, ListCredsCommand, UpdateCredCommand, UploadCredCommand,
};
pub use projects::ListProjectsCommand;

use crate::cloudbuild::HttpClient;
use crate::context::Context;
use crate::form::{FieldSpec, FlagSet, Populator, Record};
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::sync::Arc;

/// Shared by every API command
pub const API_KEY: FieldSpec = FieldSpec::new("ApiKey").named("apiKey").global();
pub const ORG_ID: FieldSpec = FieldSpec::new("OrgId").named("orgId").global();

/// Authenticated access to one organization
pub struct Session {
    pub client: Arc<dyn HttpClient>,
    pub org_id: String,
}

/// Run the global pass and connect with the resulting credentials
pub fn open_session(ctx: &Context, flags: &FlagSet, record: &mut Record) -> Result<Session> {
    Populator::new(ctx.input.as_ref()).populate_global(flags, record)?;

    let client = ctx.api.connect(record.require("apiKey")?)?;
    Ok(Session {
        client,
        org_id: record.require("orgId")?.to_string(),
    })
}

/// Print a value as indented JSON
pub fn print_json<T: Serialize>(ctx: &Context, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize output")?;

    ctx.output.plain(&String::from_utf8(buf)?);
    Ok(())
}
