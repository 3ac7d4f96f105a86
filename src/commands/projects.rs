use super::{API_KEY, ORG_ID, open_session};
use crate::cloudbuild::ProjectsService;
use crate::context::Context;
use crate::form::{FieldSpec, FlagSet, Populator, Record};
use anyhow::Result;

const LIST_PROJECTS: &[FieldSpec] = &[API_KEY, ORG_ID];

pub struct ListProjectsCommand;

impl ListProjectsCommand {
    /// List the organization's Cloud Build projects
    pub fn execute(ctx: &Context, flags: &FlagSet) -> Result<()> {
        let mut record = Record::new(LIST_PROJECTS);
        let session = open_session(ctx, flags, &mut record)?;
        Populator::new(ctx.input.as_ref()).populate(flags, &mut record, None)?;

        let projects = ProjectsService::new(session.client, &session.org_id).list_all()?;
        if projects.is_empty() {
            ctx.output.info("No projects found.");
            return Ok(());
        }

        for project in &projects {
            ctx.output
                .plain(&format!("Name: {} || Id: {}", project.name, project.guid));
        }

        Ok(())
    }
}
