use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Disability severity classification. Drives one binary flag column in the
/// roster export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Mild,
}

/// An employee record as the export flows see it: read-only, already adapted
/// from the upstream API's wire shape.
///
/// String-typed fields (`contract_period`, `monthly_salary`) carry the
/// upstream formatting verbatim; parsing happens at export time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub phone: String,
    /// Birth date as the upstream API formats it, e.g. "1990.05.21".
    pub birth_date: String,
    /// Textual date range, e.g. "2025.01.01 ~ 2026.12.31".
    pub contract_period: String,
    /// Free-text disability type name, e.g. "지체장애".
    pub disability_type: String,
    pub severity: Severity,
    /// Formatted currency string, e.g. "월 2,500,000원".
    pub monthly_salary: String,
    /// General submission document (image or PDF).
    pub document_url: Option<String>,
    /// Severe-disability certificate (image or PDF).
    pub certificate_url: Option<String>,
}
