//! # docket-pdf
//!
//! Layout and rendering of quotation and invoice documents.
//!
//! A caller hands over a [`DocumentRequest`] and the issuing company. The
//! request is validated into a [`Document`] tree, the layout engine positions
//! every block on a single page, and a [`RenderBackend`] turns the resulting
//! draw instructions into bytes.
//!
//! ```no_run
//! use docket_pdf::{render_pdf, DocumentRecord, DocumentRequest, Issuer, LayoutConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record: DocumentRecord = serde_json::from_str(r#"{"quotation_number": "Q-1"}"#)?;
//!     let company = Issuer::default();
//!     let pdf = render_pdf(
//!         &DocumentRequest::new("quotation", record),
//!         &company,
//!         &LayoutConfig::default(),
//!     )?;
//!     println!("{} bytes", pdf.len());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod layout;
pub mod model;
pub mod text;

pub use backend::{
    Align, DrawInstruction, FontStyle, PrintPdfBackend, RecordingBackend, RenderBackend, Rule, TextRun,
    TextStyle,
};
pub use config::{ContentBounds, LayoutConfig, PageBreakPolicy, PageMetrics};
pub use document::{build, build_request, build_with_columns, Document, DocumentKind};
pub use error::{Error, FormatError, RenderError, Result, ValidationError};
pub use format::{format_currency, format_date};
pub use layout::{column_offsets, layout, render, LayoutCursor};
pub use model::{DocumentRecord, DocumentRequest, Issuer, Money};

/// Validate, lay out and encode `request` with an arbitrary backend.
pub fn render_with<B: RenderBackend>(
    request: &DocumentRequest,
    company: &Issuer,
    config: &LayoutConfig,
    backend: B,
) -> Result<Vec<u8>> {
    let document = build_with_columns(&request.kind, &request.record, company, &config.column_widths)?;
    Ok(render(&document, config, backend)?)
}

/// Validate, lay out and encode `request` as a PDF.
pub fn render_pdf(request: &DocumentRequest, company: &Issuer, config: &LayoutConfig) -> Result<Vec<u8>> {
    let document = build_with_columns(&request.kind, &request.record, company, &config.column_widths)?;
    let title = format!("{} {}", document.header.title, document.header.number);
    let backend = PrintPdfBackend::new(&title, config.page)?;
    Ok(render(&document, config, backend)?)
}

/// [`render_pdf`] on tokio's blocking pool.
///
/// Resolves to the finished buffer or the first error. Each call owns its
/// inputs and backend, so any number may run at once.
#[cfg(feature = "async")]
pub async fn render_pdf_async(
    request: DocumentRequest,
    company: Issuer,
    config: LayoutConfig,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || render_pdf(&request, &company, &config))
        .await
        .map_err(|e| RenderError::Join(e.to_string()))?
}
