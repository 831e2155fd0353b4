//! Caller-supplied records.
//!
//! Everything here is loosely typed on purpose: fields are optional and
//! amounts may arrive as JSON numbers or numeric strings. The document
//! builder turns a [`DocumentRequest`] into a fully typed
//! [`Document`](crate::document::Document) or rejects it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed-point monetary amount.
pub type Money = Decimal;

/// One render call's input: a document type tag plus its record.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub kind: String,
    pub record: DocumentRecord,
}

impl DocumentRequest {
    pub fn new(kind: impl Into<String>, record: DocumentRecord) -> Self {
        Self {
            kind: kind.into(),
            record,
        }
    }
}

/// A quotation or invoice row as stored by the surrounding service.
///
/// Both the neutral field names and the per-type names used by the
/// quotation and invoice tables are accepted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentRecord {
    #[serde(default, alias = "quotation_number", alias = "invoice_number")]
    pub document_number: Option<String>,
    #[serde(default, alias = "quotation_date", alias = "invoice_date")]
    pub document_date: Option<String>,
    #[serde(default, alias = "expiration_date", alias = "due_date")]
    pub deadline_date: Option<String>,
    #[serde(flatten)]
    pub recipient: PartyRecord,
    #[serde(default)]
    pub items: Vec<LineItemRecord>,
    #[serde(default)]
    pub subtotal: Option<RawNumber>,
    #[serde(default)]
    pub tax_amount: Option<RawNumber>,
    #[serde(default)]
    pub total_amount: Option<RawNumber>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub banking: BankingRecord,
}

/// Recipient address fields, flattened into the record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PartyRecord {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "zip")]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LineItemRecord {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<RawNumber>,
    #[serde(default)]
    pub unit_price: Option<RawNumber>,
    #[serde(default)]
    pub subtotal: Option<RawNumber>,
    #[serde(default)]
    pub tax_rate: Option<RawNumber>,
    #[serde(default)]
    pub tax_amount: Option<RawNumber>,
    #[serde(default)]
    pub total_amount: Option<RawNumber>,
}

/// Payment details. Only meaningful on invoices.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BankingRecord {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default, alias = "branch")]
    pub bank_branch: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub swift_code: Option<String>,
    #[serde(default, alias = "routing_code")]
    pub aba_routing: Option<String>,
}

impl BankingRecord {
    /// True when at least one banking field was supplied.
    pub fn is_supplied(&self) -> bool {
        [
            &self.bank_name,
            &self.bank_branch,
            &self.account_number,
            &self.account_name,
            &self.swift_code,
            &self.aba_routing,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// A number as it came off the wire: JSON number or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    pub fn as_text(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl From<u64> for RawNumber {
    fn from(value: u64) -> Self {
        RawNumber::Number(value.into())
    }
}

/// The issuing company, supplied by configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Issuer {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub website: Option<String>,
}
