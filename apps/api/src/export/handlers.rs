use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::roster::{header_row, synthesize_rows, RosterContext};
use crate::export::workbook::build_workbook;
use crate::export::{attachment_response, XLSX_CONTENT_TYPE};
use crate::state::AppState;

/// GET /api/v1/export/roster/:company_id
///
/// Synthesizes the regulatory roster spreadsheet for a company. Refused with
/// a validation error — no file is produced — when the company has no
/// employees.
pub async fn handle_export_roster(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let company = state.directory.get_company(company_id).await?;
    let employees = state.directory.list_employees(company_id).await?;
    if employees.is_empty() {
        return Err(AppError::Validation("내보낼 직원이 없습니다.".to_string()));
    }

    let today = Utc::now().date_naive();
    let ctx = RosterContext {
        reference_year: state.config.reference_year_for(today),
        company,
        today,
    };

    let rows = synthesize_rows(&ctx, &employees);
    let bytes = build_workbook(&header_row(), &rows)
        .map_err(|e| AppError::Export(format!("roster workbook: {e}")))?;

    info!(
        "Roster export for {} ({} employees, reference year {})",
        ctx.company.name,
        employees.len(),
        ctx.reference_year
    );

    let filename = format!(
        "{}_근로자명부_{}.xlsx",
        ctx.company.name,
        today.format("%Y%m%d")
    );
    Ok(attachment_response(&filename, XLSX_CONTENT_TYPE, bytes))
}
