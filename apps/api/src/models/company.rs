use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client company. Legal metadata feeds the export headers and filenames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    /// 사업자등록번호 — kept as the formatted string the upstream API returns.
    pub registration_number: String,
    pub ceo_name: String,
    pub address: String,
}
