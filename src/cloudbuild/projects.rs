use super::client::HttpClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub guid: String,
    #[serde(rename = "projectid", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(rename = "orgid", default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

pub struct ProjectsService {
    client: Arc<dyn HttpClient>,
    org_id: String,
}

impl ProjectsService {
    pub fn new(client: Arc<dyn HttpClient>, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }

    /// List every project in the organization
    pub fn list_all(&self) -> Result<Vec<Project>> {
        let body = self
            .client
            .get(&format!("/orgs/{}/projects", self.org_id))?;
        serde_json::from_str(&body).context("Failed to parse project list")
    }
}
