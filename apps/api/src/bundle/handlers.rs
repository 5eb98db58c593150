use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::bundle::{BundleError, DocumentCategory};
use crate::errors::AppError;
use crate::export::{attachment_response, PDF_CONTENT_TYPE};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CategoryQuery {
    #[serde(default = "default_category")]
    pub category: DocumentCategory,
}

fn default_category() -> DocumentCategory {
    DocumentCategory::General
}

/// GET /api/v1/export/documents/:company_id?category=general|certificate
///
/// Bundles every eligible employee document into one PDF, one page per
/// employee. Refused when no employee has a document in the category.
pub async fn handle_export_documents(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<CategoryQuery>,
) -> Result<Response, AppError> {
    let company = state.directory.get_company(company_id).await?;
    let employees = state.directory.list_employees(company_id).await?;
    if employees.is_empty() {
        return Err(AppError::Validation("내보낼 직원이 없습니다.".to_string()));
    }

    let bytes = state
        .bundler
        .bundle(&employees, query.category)
        .await
        .map_err(|e| match e {
            BundleError::NoDocuments => {
                AppError::Validation("첨부된 문서가 없습니다.".to_string())
            }
            other => AppError::Export(format!("document bundle: {other}")),
        })?;

    info!(
        "Document bundle ({}) for {} produced",
        query.category.label(),
        company.name
    );

    let filename = format!(
        "{}_{}_{}.pdf",
        company.name,
        query.category.label(),
        Utc::now().date_naive().format("%Y%m%d")
    );
    Ok(attachment_response(&filename, PDF_CONTENT_TYPE, bytes))
}
