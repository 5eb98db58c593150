//! Directory client — the single point of entry for the upstream company and
//! employee read API.
//!
//! ARCHITECTURAL RULE: no other module may call the directory API directly.
//! The wire shapes live in [`wire`] and are adapted into the internal view
//! model here; everything downstream (roster synthesis, document bundling)
//! only ever sees [`crate::models`] types.

use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Company, Employee};

pub mod wire;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Directory API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Company {0} not found")]
    CompanyNotFound(Uuid),
}

/// Read-only client for the company/employee directory.
#[derive(Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    /// Fetches a single company record.
    pub async fn get_company(&self, company_id: Uuid) -> Result<Company, DirectoryError> {
        let url = format!("{}/api/companies/{company_id}", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status().as_u16() == 404 {
            return Err(DirectoryError::CompanyNotFound(company_id));
        }
        let response = check_status(response).await?;

        let record: wire::CompanyRecord = response.json().await?;
        Ok(record.into())
    }

    /// Fetches all employees of a company, adapted into the internal model.
    /// Upstream ordering is preserved; exports depend on it for stable output.
    pub async fn list_employees(&self, company_id: Uuid) -> Result<Vec<Employee>, DirectoryError> {
        let url = format!("{}/api/companies/{company_id}/employees", self.base_url);
        let response = check_status(self.client.get(&url).send().await?).await?;

        let records: Vec<wire::EmployeeRecord> = response.json().await?;
        debug!(
            "Loaded {} employee records for company {company_id}",
            records.len()
        );

        Ok(records.into_iter().map(Employee::from).collect())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DirectoryError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DirectoryError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}
