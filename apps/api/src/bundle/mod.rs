//! Document bundler — collects each eligible employee's submitted document
//! into a single PDF, one page per employee.
//!
//! Documents are fetched and appended strictly sequentially: page order must
//! match employee order, and that ordering guarantee is worth more here than
//! fetch parallelism. A failure on one employee (network, decode, malformed
//! source PDF) is isolated to that employee's page, which becomes a localized
//! placeholder instead of aborting the whole batch.
//!
//! Both document categories — the general submission document and the
//! severe-disability certificate — run through this same bundler;
//! [`DocumentCategory`] only selects the URL field and the output labels.

use image::ImageFormat;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Employee;

pub mod handlers;
pub mod page;

use page::{PageError, PdfWriter};

/// Message rendered on a placeholder page when an employee's document could
/// not be bundled.
const PLACEHOLDER_MESSAGE: &str = "문서를 불러오지 못했습니다.";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("no employee has a document in this category")]
    NoDocuments,

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Which per-employee document URL a bundle draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    General,
    Certificate,
}

impl DocumentCategory {
    pub fn url_of<'a>(&self, employee: &'a Employee) -> Option<&'a str> {
        match self {
            DocumentCategory::General => employee.document_url.as_deref(),
            DocumentCategory::Certificate => employee.certificate_url.as_deref(),
        }
    }

    /// Korean label used in the output filename.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::General => "제출서류",
            DocumentCategory::Certificate => "중증장애인확인서",
        }
    }
}

/// Why a single employee's document fell back to a placeholder page.
#[derive(Debug, Error)]
enum DocumentError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Fetches and bundles employee documents. Holds the only HTTP client that
/// touches document URLs.
#[derive(Clone)]
pub struct DocumentBundler {
    client: Client,
}

impl DocumentBundler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Produces the bundled PDF for one category. The output has exactly one
    /// page per eligible employee, in input order — real content where the
    /// document could be fetched and decoded, a placeholder otherwise.
    pub async fn bundle(
        &self,
        employees: &[Employee],
        category: DocumentCategory,
    ) -> Result<Vec<u8>, BundleError> {
        let eligible: Vec<(&Employee, &str)> = employees
            .iter()
            .filter_map(|e| category.url_of(e).map(|url| (e, url)))
            .collect();
        if eligible.is_empty() {
            return Err(BundleError::NoDocuments);
        }

        let mut writer = PdfWriter::new();
        for (employee, url) in eligible {
            match self.append_document(&mut writer, url).await {
                Ok(()) => debug!("Bundled document for {}", employee.name),
                Err(e) => {
                    warn!(
                        "Document for {} ({url}) failed, substituting placeholder: {e}",
                        employee.name
                    );
                    writer.add_placeholder_page(&employee.name, PLACEHOLDER_MESSAGE)?;
                }
            }
        }

        debug!("Bundle complete: {} pages", writer.page_count());
        Ok(writer.finish()?)
    }

    /// Fetches one document and appends it as a single page. Content-type
    /// header decides the branch, with a `%PDF` magic-byte fallback for
    /// servers that mislabel PDFs as octet-streams.
    async fn append_document(&self, writer: &mut PdfWriter, url: &str) -> Result<(), DocumentError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let bytes = response.bytes().await?;

        if content_type.contains("pdf") || bytes.starts_with(b"%PDF") {
            writer.add_pdf_first_page(&bytes)?;
        } else {
            let format = image::guess_format(&bytes).ok();
            let decoded = image::load_from_memory(&bytes)?;
            // Keep already-compressed JPEG data as-is when it is plain RGB.
            let jpeg = (format == Some(ImageFormat::Jpeg)
                && decoded.color() == image::ColorType::Rgb8)
                .then_some(bytes.as_ref());
            writer.add_image_page(&decoded, jpeg)?;
        }
        Ok(())
    }
}
