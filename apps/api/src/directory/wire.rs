//! Wire shapes of the upstream directory API (camelCase JSON) and their
//! adaptation into the internal view model.

use serde::Deserialize;
use uuid::Uuid;

use crate::models::{Company, Employee, Severity};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub ceo_name: String,
    pub address: String,
}

impl From<CompanyRecord> for Company {
    fn from(r: CompanyRecord) -> Self {
        Company {
            id: r.id,
            name: r.name,
            registration_number: r.registration_number,
            ceo_name: r.ceo_name,
            address: r.address,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub contract_period: String,
    #[serde(default)]
    pub disability_type: String,
    /// Free-text level, "중증" (severe) or "경증" (mild).
    #[serde(default)]
    pub disability_level: String,
    #[serde(default)]
    pub monthly_salary: String,
    pub document_url: Option<String>,
    pub severe_certificate_url: Option<String>,
}

impl From<EmployeeRecord> for Employee {
    fn from(r: EmployeeRecord) -> Self {
        // Anything that is not explicitly severe counts as mild.
        let severity = if r.disability_level.contains("중증") {
            Severity::Severe
        } else {
            Severity::Mild
        };

        Employee {
            id: r.id,
            company_id: r.company_id,
            name: r.name,
            phone: r.phone,
            birth_date: r.birth_date,
            contract_period: r.contract_period,
            disability_type: r.disability_type,
            severity,
            monthly_salary: r.monthly_salary,
            document_url: none_if_blank(r.document_url),
            certificate_url: none_if_blank(r.severe_certificate_url),
        }
    }
}

/// The upstream API represents "no document" as either `null` or `""`.
fn none_if_blank(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.trim().is_empty())
}
