// docket-pdf: Render quotation and invoice PDFs from JSON records

use clap::{Parser, ValueEnum};
use docket_pdf::{
    build_with_columns, layout, render_pdf, DocumentRecord, DocumentRequest, Issuer, LayoutConfig,
    PageBreakPolicy, RecordingBackend,
};
use log::info;
use std::fs;
use thiserror::Error;

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Invalid JSON in {0}: {1}")]
    JsonError(String, serde_json::Error),
    #[error(transparent)]
    DocumentError(#[from] docket_pdf::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Render quotation and invoice PDFs")]
struct Args {
    /// Document type (quotation or invoice)
    #[arg(short = 't', long = "type")]
    kind: String,

    /// Quotation or invoice record (JSON)
    #[arg(short, long)]
    input: String,

    /// Issuing company details (JSON)
    #[arg(short, long)]
    company: String,

    /// Layout configuration (JSON, optional)
    #[arg(long)]
    config: Option<String>,

    /// What to do when content does not fit on the page
    #[arg(long, value_enum)]
    page_break: Option<PageBreakArg>,

    /// Output filename (defaults to {type}-{number}.pdf)
    #[arg(short, long)]
    output: Option<String>,

    /// Print the positioned draw instructions as JSON instead of writing a PDF
    #[arg(long)]
    dump_layout: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PageBreakArg {
    Fail,
    Overflow,
}

impl From<PageBreakArg> for PageBreakPolicy {
    fn from(arg: PageBreakArg) -> Self {
        match arg {
            PageBreakArg::Fail => PageBreakPolicy::Fail,
            PageBreakArg::Overflow => PageBreakPolicy::Overflow,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let record: DocumentRecord = load_json(&args.input)?;
    let company: Issuer = load_json(&args.company)?;
    let mut config: LayoutConfig = match &args.config {
        Some(path) => load_json(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(policy) = args.page_break {
        config.page_break = policy.into();
    }

    if args.dump_layout {
        let document = build_with_columns(&args.kind, &record, &company, &config.column_widths)?;
        let mut backend = RecordingBackend::new();
        let instructions = layout(&document, &config, &mut backend).map_err(docket_pdf::Error::from)?;
        let json = serde_json::to_string_pretty(&instructions)
            .map_err(|e| AppError::JsonError("layout".to_string(), e))?;
        println!("{}", json);
        return Ok(());
    }

    let output_file = args.output.clone().unwrap_or_else(|| default_output_name(&args.kind, &record));
    let request = DocumentRequest::new(args.kind, record);

    // Generate PDF
    let pdf = render_pdf(&request, &company, &config)?;
    fs::write(&output_file, &pdf)?;
    info!("wrote {} bytes to {}", pdf.len(), output_file);

    println!("✓ Generated: {}", output_file);
    println!("  Type: {}", request.kind.to_lowercase());
    if let Some(number) = &request.record.document_number {
        println!("  Number: {}", number);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn load_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, AppError> {
    let content = fs::read_to_string(path).map_err(|e| AppError::ReadError(path.to_string(), e))?;
    serde_json::from_str(&content).map_err(|e| AppError::JsonError(path.to_string(), e))
}

fn default_output_name(kind: &str, record: &DocumentRecord) -> String {
    let number = record
        .document_number
        .as_deref()
        .unwrap_or("draft")
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>();
    format!("{}-{}.pdf", kind.trim().to_lowercase(), number)
}
