//! Document model: validates a record and assembles the block tree the
//! layout engine walks.

use std::str::FromStr;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::backend::Align;
use crate::error::{Result, ValidationError};
use crate::format::{parse_amount, parse_date, parse_quantity, parse_rate};
use crate::model::{
    BankingRecord, DocumentRecord, DocumentRequest, Issuer, LineItemRecord, Money, PartyRecord,
    RawNumber,
};

/// Item, quantity, unit price, subtotal, tax rate, tax amount, total.
pub const DEFAULT_COLUMN_WIDTHS: [f32; 7] = [190.0, 40.0, 60.0, 60.0, 40.0, 52.0, 70.0];

const COLUMN_LABELS: [&str; 7] = ["Item", "Qty", "Unit Price", "Subtotal", "Tax Rate", "Tax", "Total"];

// ============================================================================
// Document Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    Quotation,
    Invoice,
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quotation" => Ok(DocumentKind::Quotation),
            "invoice" => Ok(DocumentKind::Invoice),
            _ => Err(ValidationError::UnknownType(s.to_string())),
        }
    }
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "quotation",
            DocumentKind::Invoice => "invoice",
        }
    }

    fn title(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "QUOTATION",
            DocumentKind::Invoice => "INVOICE",
        }
    }

    /// Number, date and deadline labels.
    fn header_labels(self) -> [&'static str; 3] {
        match self {
            DocumentKind::Quotation => ["Quotation Number", "Quotation Date", "Expiration Date"],
            DocumentKind::Invoice => ["Invoice Number", "Invoice Date", "Due Date"],
        }
    }
}

// ============================================================================
// Document Tree
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub kind: DocumentKind,
    pub header: HeaderBlock,
    pub recipient: PartyBlock,
    pub issuer: PartyBlock,
    pub table: TableBlock,
    pub totals: TotalsBlock,
    pub banking: Option<BankingBlock>,
    pub notes: Option<NotesBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    pub title: &'static str,
    pub number_label: &'static str,
    pub number: String,
    pub date_label: &'static str,
    pub date: NaiveDate,
    pub deadline_label: &'static str,
    pub deadline: NaiveDate,
}

/// A heading plus the address lines that are actually present.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyBlock {
    pub heading: &'static str,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub company_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl PartyBlock {
    pub fn recipient(party: &Party) -> Self {
        let mut lines = vec![party.company_name.clone(), party.address_line1.clone()];
        if let Some(line2) = &party.address_line2 {
            lines.push(line2.clone());
        }
        lines.push(format!("{}, {} {}", party.city, party.state, party.zip));
        lines.push(party.country.clone());
        Self {
            heading: "To:",
            lines,
        }
    }

    pub fn issuer(company: &Issuer) -> Self {
        let mut lines = vec![
            company.name.clone(),
            company.address.clone(),
            format!("TEL: {}", company.phone),
            format!("Email: {}", company.email),
        ];
        if let Some(website) = company.website.as_deref().filter(|w| !w.trim().is_empty()) {
            lines.push(format!("Web: {}", website));
        }
        Self {
            heading: "From:",
            lines,
        }
    }
}

/// Header label, width and alignment of one table column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub width: f32,
    pub align: Align,
}

impl ColumnSpec {
    /// The fixed seven-column line item schema. Only the item column is left-aligned.
    pub fn line_item_columns(widths: &[f32; 7]) -> Vec<ColumnSpec> {
        COLUMN_LABELS
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (label, width))| ColumnSpec {
                label: *label,
                width: *width,
                align: if i == 0 { Align::Left } else { Align::Right },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: u64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub tax_rate: Decimal,
    pub tax_amount: Money,
    pub total_amount: Money,
}

impl LineItem {
    /// Text of the item cell: the name, then the description on its own line.
    pub fn item_text(&self) -> String {
        match &self.description {
            Some(description) => format!("{}\n{}", self.product_name, description),
            None => self.product_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub columns: Vec<ColumnSpec>,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalsBlock {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankingBlock {
    pub bank_name: String,
    pub branch: String,
    pub account_number: String,
    pub account_name: String,
    pub swift_code: String,
    pub routing_code: String,
}

impl BankingBlock {
    pub fn labeled_lines(&self) -> [String; 6] {
        [
            format!("Bank Name: {}", self.bank_name),
            format!("Branch: {}", self.branch),
            format!("Account Number: {}", self.account_number),
            format!("Account Name: {}", self.account_name),
            format!("SWIFT Code: {}", self.swift_code),
            format!("ABA/Routing: {}", self.routing_code),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotesBlock {
    pub text: String,
}

// ============================================================================
// Builder
// ============================================================================

/// Validate `record` as a document of type `kind` and assemble its tree.
pub fn build(kind: &str, record: &DocumentRecord, company: &Issuer) -> Result<Document> {
    build_with_columns(kind, record, company, &DEFAULT_COLUMN_WIDTHS)
}

/// [`build`] for a request carrying its own type tag.
pub fn build_request(request: &DocumentRequest, company: &Issuer) -> Result<Document> {
    build(&request.kind, &request.record, company)
}

/// Like [`build`], with explicit table column widths.
pub fn build_with_columns(
    kind: &str,
    record: &DocumentRecord,
    company: &Issuer,
    widths: &[f32; 7],
) -> Result<Document> {
    let kind = DocumentKind::from_str(kind)?;

    let [number_label, date_label, deadline_label] = kind.header_labels();
    let header = HeaderBlock {
        title: kind.title(),
        number_label,
        number: required(&record.document_number, "document_number")?.to_string(),
        date_label,
        date: parse_date(required(&record.document_date, "document_date")?)?,
        deadline_label,
        deadline: parse_date(required(&record.deadline_date, "deadline_date")?)?,
    };

    let recipient = build_party(&record.recipient)?;
    if company.name.trim().is_empty() {
        return Err(ValidationError::MissingField("company.name".to_string()).into());
    }

    let items = record
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| build_line_item(i, item))
        .collect::<Result<Vec<_>>>()?;

    let totals = TotalsBlock {
        subtotal: required_amount(&record.subtotal, "subtotal")?,
        tax_amount: required_amount(&record.tax_amount, "tax_amount")?,
        total_amount: required_amount(&record.total_amount, "total_amount")?,
    };

    let banking = match kind {
        DocumentKind::Invoice if record.banking.is_supplied() => Some(build_banking(&record.banking)?),
        DocumentKind::Quotation if record.banking.is_supplied() => {
            debug!("ignoring banking details on quotation {}", header.number);
            None
        }
        _ => None,
    };

    let notes = record
        .notes
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(|text| NotesBlock {
            text: text.to_string(),
        });

    debug!(
        "built {} {} with {} line item(s)",
        kind.as_str(),
        header.number,
        items.len()
    );

    Ok(Document {
        kind,
        header,
        recipient: PartyBlock::recipient(&recipient),
        issuer: PartyBlock::issuer(company),
        table: TableBlock {
            columns: ColumnSpec::line_item_columns(widths),
            items,
        },
        totals,
        banking,
        notes,
    })
}

fn build_party(party: &PartyRecord) -> Result<Party> {
    Ok(Party {
        company_name: required(&party.company_name, "recipient.company_name")?.to_string(),
        address_line1: required(&party.address_line1, "recipient.address_line1")?.to_string(),
        address_line2: optional(&party.address_line2),
        city: required(&party.city, "recipient.city")?.to_string(),
        state: required(&party.state, "recipient.state")?.to_string(),
        zip: required(&party.zip_code, "recipient.zip_code")?.to_string(),
        country: required(&party.country, "recipient.country")?.to_string(),
    })
}

fn build_line_item(index: usize, item: &LineItemRecord) -> Result<LineItem> {
    let field = |name: &str| format!("items[{}].{}", index, name);

    Ok(LineItem {
        product_name: required(&item.product_name, &field("product_name"))?.to_string(),
        description: optional(&item.description),
        quantity: parse_quantity(&required_number(&item.quantity, &field("quantity"))?)?,
        unit_price: required_amount(&item.unit_price, &field("unit_price"))?,
        subtotal: required_amount(&item.subtotal, &field("subtotal"))?,
        tax_rate: parse_rate(&required_number(&item.tax_rate, &field("tax_rate"))?)?,
        tax_amount: required_amount(&item.tax_amount, &field("tax_amount"))?,
        total_amount: required_amount(&item.total_amount, &field("total_amount"))?,
    })
}

fn build_banking(banking: &BankingRecord) -> Result<BankingBlock> {
    Ok(BankingBlock {
        bank_name: required(&banking.bank_name, "banking.bank_name")?.to_string(),
        branch: required(&banking.bank_branch, "banking.bank_branch")?.to_string(),
        account_number: required(&banking.account_number, "banking.account_number")?.to_string(),
        account_name: required(&banking.account_name, "banking.account_name")?.to_string(),
        swift_code: required(&banking.swift_code, "banking.swift_code")?.to_string(),
        routing_code: required(&banking.aba_routing, "banking.aba_routing")?.to_string(),
    })
}

// Blank strings count as absent.
fn required<'a>(value: &'a Option<String>, field: &str) -> std::result::Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_number(value: &Option<RawNumber>, field: &str) -> std::result::Result<String, ValidationError> {
    value
        .as_ref()
        .map(RawNumber::as_text)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

fn required_amount(value: &Option<RawNumber>, field: &str) -> Result<Money> {
    Ok(parse_amount(&required_number(value, field)?)?)
}
