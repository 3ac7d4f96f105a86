use super::client::{FormMethod, HttpClient, UploadForm};
use crate::form::{Candidate, CandidateSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// iOS signing credential as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IosCredential {
    #[serde(rename = "credentialid")]
    pub credential_id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(rename = "lastMod", default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    #[serde(
        rename = "provisioningProfile",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provisioning_profile: Option<ProvisioningProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_distribution: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enterprise_profile: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_devices: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,
}

/// Files and metadata sent when creating or replacing a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialUpload<'a> {
    pub label: &'a str,
    pub cert_path: &'a str,
    pub profile_path: &'a str,
    pub cert_pass: &'a str,
}

impl CredentialUpload<'_> {
    fn into_form(self) -> UploadForm {
        UploadForm::new()
            .text("label", self.label)
            .text("certificatePass", self.cert_pass)
            .file("fileCertificate", self.cert_path)
            .file("fileProvisioningProfile", self.profile_path)
    }
}

/// iOS signing credentials of one organization
pub struct CredentialsService {
    client: Arc<dyn HttpClient>,
    org_id: String,
}

impl CredentialsService {
    pub fn new(client: Arc<dyn HttpClient>, org_id: &str) -> Self {
        Self {
            client,
            org_id: org_id.to_string(),
        }
    }

    fn ios_path(&self) -> String {
        format!("/orgs/{}/credentials/signing/ios", self.org_id)
    }

    fn ios_credential_path(&self, credential_id: &str) -> String {
        format!("{}/{}", self.ios_path(), credential_id)
    }

    pub fn get_all_ios(&self) -> Result<Vec<IosCredential>> {
        let body = self.client.get(&self.ios_path())?;
        serde_json::from_str(&body).context("Failed to parse credential list")
    }

    pub fn get_ios(&self, credential_id: &str) -> Result<IosCredential> {
        let body = self.client.get(&self.ios_credential_path(credential_id))?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse credential '{}'", credential_id))
    }

    pub fn update_ios(
        &self,
        credential_id: &str,
        upload: CredentialUpload<'_>,
    ) -> Result<IosCredential> {
        let body = self.client.send_form(
            FormMethod::Put,
            &self.ios_credential_path(credential_id),
            upload.into_form(),
        )?;
        serde_json::from_str(&body).context("Failed to parse updated credential")
    }

    pub fn upload_ios(&self, upload: CredentialUpload<'_>) -> Result<IosCredential> {
        let body = self
            .client
            .send_form(FormMethod::Post, &self.ios_path(), upload.into_form())?;
        serde_json::from_str(&body).context("Failed to parse uploaded credential")
    }

    /// Delete a credential, returning the response status
    pub fn delete_ios(&self, credential_id: &str) -> Result<String> {
        self.client.delete(&self.ios_credential_path(credential_id))
    }
}

impl CandidateSource for CredentialsService {
    fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self
            .get_all_ios()?
            .into_iter()
            .map(|cred| Candidate::new(cred.label, cred.credential_id))
            .collect())
    }
}
