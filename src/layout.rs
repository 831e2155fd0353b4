//! Box layout for quotations and invoices.
//!
//! Each block is laid out by a step that takes the current [`LayoutCursor`]
//! and returns the cursor below what it drew. Steps never read or write any
//! other shared position, so a block can be laid out and tested on its own.
//! Every primitive goes to the backend as soon as it is placed and is also
//! returned to the caller in emission order.

use log::{debug, warn};

use crate::backend::{Align, DrawInstruction, RenderBackend, Rule, TextRun, TextStyle};
use crate::config::{ContentBounds, LayoutConfig, PageBreakPolicy};
use crate::document::{
    BankingBlock, ColumnSpec, Document, HeaderBlock, LineItem, NotesBlock, PartyBlock, TableBlock,
    TotalsBlock,
};
use crate::error::RenderError;
use crate::format::{format_currency, format_naive_date, format_quantity, format_rate};
use crate::text::line_height;

// ============================================================================
// Constants
// ============================================================================

/// Font sizes in points
const TITLE_FONT_SIZE: f32 = 20.0;
const SECTION_FONT_SIZE: f32 = 14.0;
const BODY_FONT_SIZE: f32 = 12.0;
const BLOCK_HEADING_FONT_SIZE: f32 = 12.0;
const TABLE_FONT_SIZE: f32 = 10.0;

/// Table header: rule offset below its top, and where the first body row starts
const HEADER_RULE_OFFSET: f32 = 15.0;
const HEADER_ROW_HEIGHT: f32 = 20.0;

/// Closing rule sits this far above the cursor after the last row
const CLOSING_RULE_LIFT: f32 = 5.0;

/// Totals: gap above, line advance, and label/value boxes. The boxes sit at
/// fixed offsets from the content left edge, not on the table grid.
const TOTALS_GAP: f32 = 10.0;
const TOTALS_LINE_HEIGHT: f32 = 20.0;
const TOTALS_LABEL_OFFSET: f32 = 320.0;
const TOTALS_LABEL_WIDTH: f32 = 100.0;
const TOTALS_VALUE_OFFSET: f32 = 420.0;
const TOTALS_VALUE_WIDTH: f32 = 70.0;

/// Banking and notes blocks. A block's heading sits `BLOCK_GAP` below the
/// point where the previous block ended. Banking ends `BLOCK_TAIL` below
/// the top of its last line, the same as the totals.
const BLOCK_GAP: f32 = 20.0;
const BLOCK_TAIL: f32 = 20.0;
const BLOCK_HEADING_ADVANCE: f32 = 20.0;
const BANKING_LINE_HEIGHT: f32 = 15.0;

const WIDTH_EPSILON: f32 = 1e-3;

// ============================================================================
// Cursor and Geometry
// ============================================================================

/// Write position during one layout call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f32,
    pub y: f32,
    pub bounds: ContentBounds,
}

impl LayoutCursor {
    pub fn new(bounds: ContentBounds) -> Self {
        Self {
            x: bounds.left,
            y: bounds.top,
            bounds,
        }
    }

    pub fn advance(self, dy: f32) -> Self {
        Self { y: self.y + dy, ..self }
    }

    /// Space left above the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.bounds.bottom - self.y
    }
}

/// Left edge of every column: a running sum of widths starting at `left`.
pub fn column_offsets(left: f32, columns: &[ColumnSpec]) -> Vec<f32> {
    columns
        .iter()
        .scan(left, |x, column| {
            let offset = *x;
            *x += column.width;
            Some(offset)
        })
        .collect()
}

/// Row height for an item cell whose wrapped text measures `measured` points.
pub fn row_height(measured: f32, config: &LayoutConfig) -> f32 {
    measured.max(config.min_row_height) + config.row_padding
}

fn table_geometry(columns: &[ColumnSpec], bounds: &ContentBounds) -> Result<(Vec<f32>, f32), RenderError> {
    if let Some((index, column)) = columns
        .iter()
        .enumerate()
        .find(|(_, c)| !(c.width.is_finite() && c.width > 0.0))
    {
        return Err(RenderError::InvalidColumn {
            index,
            width: column.width,
        });
    }

    let offsets = column_offsets(bounds.left, columns);
    let table_right = bounds.left + columns.iter().map(|c| c.width).sum::<f32>();
    if table_right > bounds.right + WIDTH_EPSILON {
        return Err(RenderError::TableTooWide {
            table_right,
            content_right: bounds.right,
        });
    }
    Ok((offsets, table_right))
}

// ============================================================================
// Entry Points
// ============================================================================

/// Lay out `document` against `backend`, returning the instructions drawn.
pub fn layout<B: RenderBackend>(
    document: &Document,
    config: &LayoutConfig,
    backend: &mut B,
) -> Result<Vec<DrawInstruction>, RenderError> {
    let bounds = config.page.content_bounds();
    let (offsets, table_right) = table_geometry(&document.table.columns, &bounds)?;
    debug!(
        "laying out {} {}: {} row(s), table {:.1}..{:.1}pt",
        document.kind.as_str(),
        document.header.number,
        document.table.items.len(),
        bounds.left,
        table_right
    );

    let mut engine = LayoutEngine::new(config, backend);
    let cursor = LayoutCursor::new(bounds);

    let cursor = engine.title(&document.header, cursor)?;
    let cursor = engine.header_lines(&document.header, cursor)?;
    let cursor = engine.party(&document.recipient, cursor)?;
    let cursor = engine.party(&document.issuer, cursor)?;
    let cursor = cursor.advance(line_height(BODY_FONT_SIZE));
    let cursor = engine.table(&document.table, &offsets, table_right, cursor)?;
    let cursor = engine.totals(&document.totals, cursor)?;
    let cursor = match &document.banking {
        Some(banking) => engine.banking(banking, cursor)?,
        None => cursor,
    };
    let cursor = match &document.notes {
        Some(notes) => engine.notes(notes, cursor)?,
        None => cursor,
    };

    debug!("layout finished at y={:.1}pt", cursor.y);
    Ok(engine.emitted)
}

/// Lay out `document` and encode it with `backend`.
pub fn render<B: RenderBackend>(
    document: &Document,
    config: &LayoutConfig,
    mut backend: B,
) -> Result<Vec<u8>, RenderError> {
    layout(document, config, &mut backend)?;
    backend.finalize()
}

// ============================================================================
// Engine
// ============================================================================

struct LayoutEngine<'a, B: RenderBackend> {
    config: &'a LayoutConfig,
    backend: &'a mut B,
    emitted: Vec<DrawInstruction>,
    overflow_warned: bool,
}

impl<'a, B: RenderBackend> LayoutEngine<'a, B> {
    fn new(config: &'a LayoutConfig, backend: &'a mut B) -> Self {
        Self {
            config,
            backend,
            emitted: Vec::new(),
            overflow_warned: false,
        }
    }

    fn text(&mut self, run: TextRun) -> Result<(), RenderError> {
        self.backend.draw_text(&run)?;
        self.emitted.push(DrawInstruction::Text(run));
        Ok(())
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32) -> Result<(), RenderError> {
        let rule = Rule { x1, y1: y, x2, y2: y };
        self.backend.draw_line(&rule)?;
        self.emitted.push(DrawInstruction::Line(rule));
        Ok(())
    }

    fn ensure_room(&mut self, cursor: &LayoutCursor, needed: f32) -> Result<(), RenderError> {
        let available = cursor.remaining();
        if needed <= available {
            return Ok(());
        }
        match self.config.page_break {
            PageBreakPolicy::Fail => Err(RenderError::PageOverflow { needed, available }),
            PageBreakPolicy::Overflow => {
                if !self.overflow_warned {
                    warn!(
                        "content runs past the bottom margin at y={:.1}pt ({:.1}pt needed, {:.1}pt left)",
                        cursor.y, needed, available
                    );
                    self.overflow_warned = true;
                }
                Ok(())
            }
        }
    }

    /// A full-width run at the cursor; advances by its measured height.
    fn line(&mut self, text: String, style: TextStyle, align: Align, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let width = cursor.bounds.width();
        let height = self
            .backend
            .measure_text_height(&text, width, style)?
            .max(line_height(style.size));
        self.ensure_room(&cursor, height)?;
        self.text(TextRun {
            text,
            x: cursor.x,
            y: cursor.y,
            width,
            align,
            style,
        })?;
        Ok(cursor.advance(height))
    }

    fn title(&mut self, header: &HeaderBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let cursor = self.line(header.title.to_string(), TextStyle::bold(TITLE_FONT_SIZE), Align::Center, cursor)?;
        Ok(cursor.advance(line_height(TITLE_FONT_SIZE)))
    }

    fn header_lines(&mut self, header: &HeaderBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let lines = [
            format!("{}: {}", header.number_label, header.number),
            format!("{}: {}", header.date_label, format_naive_date(header.date)),
            format!("{}: {}", header.deadline_label, format_naive_date(header.deadline)),
        ];
        let mut cursor = cursor;
        for line in lines {
            cursor = self.line(line, TextStyle::regular(BODY_FONT_SIZE), Align::Left, cursor)?;
        }
        Ok(cursor.advance(line_height(BODY_FONT_SIZE)))
    }

    fn party(&mut self, party: &PartyBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let mut cursor = self.line(
            party.heading.to_string(),
            TextStyle::bold(SECTION_FONT_SIZE),
            Align::Left,
            cursor,
        )?;
        for line in &party.lines {
            cursor = self.line(line.clone(), TextStyle::regular(BODY_FONT_SIZE), Align::Left, cursor)?;
        }
        Ok(cursor.advance(line_height(BODY_FONT_SIZE)))
    }

    fn table(
        &mut self,
        table: &TableBlock,
        offsets: &[f32],
        table_right: f32,
        cursor: LayoutCursor,
    ) -> Result<LayoutCursor, RenderError> {
        let mut cursor = self.table_header(&table.columns, offsets, table_right, cursor)?;
        for item in &table.items {
            cursor = self.table_row(&table.columns, offsets, item, cursor)?;
        }
        self.rule(cursor.bounds.left, table_right, cursor.y - CLOSING_RULE_LIFT)?;
        Ok(cursor)
    }

    fn table_header(
        &mut self,
        columns: &[ColumnSpec],
        offsets: &[f32],
        table_right: f32,
        cursor: LayoutCursor,
    ) -> Result<LayoutCursor, RenderError> {
        self.ensure_room(&cursor, HEADER_ROW_HEIGHT)?;
        for (column, x) in columns.iter().zip(offsets) {
            self.text(TextRun {
                text: column.label.to_string(),
                x: *x,
                y: cursor.y,
                width: column.width,
                align: column.align,
                style: TextStyle::bold(TABLE_FONT_SIZE),
            })?;
        }
        self.rule(cursor.bounds.left, table_right, cursor.y + HEADER_RULE_OFFSET)?;
        Ok(cursor.advance(HEADER_ROW_HEIGHT))
    }

    fn table_row(
        &mut self,
        columns: &[ColumnSpec],
        offsets: &[f32],
        item: &LineItem,
        cursor: LayoutCursor,
    ) -> Result<LayoutCursor, RenderError> {
        let style = TextStyle::regular(TABLE_FONT_SIZE);
        let item_text = item.item_text();
        let measured = self.backend.measure_text_height(&item_text, columns[0].width, style)?;
        let height = row_height(measured, self.config);
        self.ensure_room(&cursor, height)?;

        let cells = [
            item_text,
            format_quantity(item.quantity),
            format_currency(item.unit_price),
            format_currency(item.subtotal),
            format_rate(item.tax_rate),
            format_currency(item.tax_amount),
            format_currency(item.total_amount),
        ];
        for ((text, column), x) in cells.into_iter().zip(columns).zip(offsets) {
            self.text(TextRun {
                text,
                x: *x,
                y: cursor.y,
                width: column.width,
                align: column.align,
                style,
            })?;
        }
        Ok(cursor.advance(height))
    }

    fn totals(&mut self, totals: &TotalsBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        self.ensure_room(&cursor, TOTALS_GAP + 3.0 * TOTALS_LINE_HEIGHT)?;

        let label_x = cursor.bounds.left + TOTALS_LABEL_OFFSET;
        let value_x = cursor.bounds.left + TOTALS_VALUE_OFFSET;
        let style = TextStyle::bold(TABLE_FONT_SIZE);

        let mut cursor = cursor.advance(TOTALS_GAP);
        for (label, amount) in [
            ("Subtotal:", totals.subtotal),
            ("Tax:", totals.tax_amount),
            ("Total:", totals.total_amount),
        ] {
            self.text(TextRun {
                text: label.to_string(),
                x: label_x,
                y: cursor.y,
                width: TOTALS_LABEL_WIDTH,
                align: Align::Right,
                style,
            })?;
            self.text(TextRun {
                text: format_currency(amount),
                x: value_x,
                y: cursor.y,
                width: TOTALS_VALUE_WIDTH,
                align: Align::Right,
                style,
            })?;
            cursor = cursor.advance(TOTALS_LINE_HEIGHT);
        }
        Ok(cursor)
    }

    fn block_heading(&mut self, heading: &str, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let cursor = cursor.advance(BLOCK_GAP);
        self.text(TextRun {
            text: heading.to_string(),
            x: cursor.x,
            y: cursor.y,
            width: cursor.bounds.width(),
            align: Align::Left,
            style: TextStyle::bold(BLOCK_HEADING_FONT_SIZE),
        })?;
        Ok(cursor.advance(BLOCK_HEADING_ADVANCE))
    }

    fn banking(&mut self, banking: &BankingBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let lines = banking.labeled_lines();
        let count = lines.len();
        self.ensure_room(
            &cursor,
            BLOCK_GAP + BLOCK_HEADING_ADVANCE + (count - 1) as f32 * BANKING_LINE_HEIGHT + BLOCK_TAIL,
        )?;

        let mut cursor = self.block_heading("Payment Information:", cursor)?;
        for (i, line) in lines.into_iter().enumerate() {
            self.text(TextRun {
                text: line,
                x: cursor.x,
                y: cursor.y,
                width: cursor.bounds.width(),
                align: Align::Left,
                style: TextStyle::regular(TABLE_FONT_SIZE),
            })?;
            let advance = if i + 1 == count { BLOCK_TAIL } else { BANKING_LINE_HEIGHT };
            cursor = cursor.advance(advance);
        }
        Ok(cursor)
    }

    fn notes(&mut self, notes: &NotesBlock, cursor: LayoutCursor) -> Result<LayoutCursor, RenderError> {
        let style = TextStyle::regular(TABLE_FONT_SIZE);
        let width = cursor.bounds.width();
        let body_height = self.backend.measure_text_height(&notes.text, width, style)?;
        self.ensure_room(&cursor, BLOCK_GAP + BLOCK_HEADING_ADVANCE + body_height)?;

        let cursor = self.block_heading("Notes:", cursor)?;
        self.text(TextRun {
            text: notes.text.clone(),
            x: cursor.x,
            y: cursor.y,
            width,
            align: Align::Left,
            style,
        })?;
        Ok(cursor.advance(body_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::config::PageMetrics;
    use crate::document::{build, DEFAULT_COLUMN_WIDTHS};
    use crate::model::{DocumentRecord, Issuer};

    /// Backend whose item-cell measurement is fixed, for row height checks.
    struct FixedHeightBackend {
        height: f32,
        inner: RecordingBackend,
    }

    impl RenderBackend for FixedHeightBackend {
        fn measure_text_height(&self, text: &str, width: f32, style: TextStyle) -> Result<f32, RenderError> {
            if style.size == TABLE_FONT_SIZE && width == DEFAULT_COLUMN_WIDTHS[0] {
                Ok(self.height)
            } else {
                self.inner.measure_text_height(text, width, style)
            }
        }

        fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError> {
            self.inner.draw_text(run)
        }

        fn draw_line(&mut self, rule: &Rule) -> Result<(), RenderError> {
            self.inner.draw_line(rule)
        }

        fn finalize(self) -> Result<Vec<u8>, RenderError> {
            self.inner.finalize()
        }
    }

    fn company() -> Issuer {
        Issuer {
            name: "Acme Trading".to_string(),
            address: "1-2-3 Harbor Street".to_string(),
            phone: "555-0100".to_string(),
            email: "billing@acme.test".to_string(),
            website: None,
        }
    }

    fn record(items: usize) -> DocumentRecord {
        let item = serde_json::json!({
            "product_name": "Widget",
            "quantity": 2,
            "unit_price": "100.00",
            "subtotal": "200.00",
            "tax_rate": 10,
            "tax_amount": "20.00",
            "total_amount": "220.00"
        });
        serde_json::from_value(serde_json::json!({
            "document_number": "Q-1",
            "document_date": "2024-01-05",
            "deadline_date": "2024-02-05",
            "company_name": "Globex",
            "address_line1": "42 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip_code": "62701",
            "country": "USA",
            "items": vec![item; items],
            "subtotal": "200.00",
            "tax_amount": "20.00",
            "total_amount": "220.00"
        }))
        .unwrap()
    }

    fn texts(instructions: &[DrawInstruction]) -> Vec<&TextRun> {
        instructions.iter().filter_map(DrawInstruction::as_text).collect()
    }

    fn find<'a>(instructions: &'a [DrawInstruction], text: &str) -> Option<&'a TextRun> {
        texts(instructions).into_iter().find(|r| r.text == text)
    }

    #[test]
    fn test_column_offsets_are_running_sums() {
        let columns = ColumnSpec::line_item_columns(&DEFAULT_COLUMN_WIDTHS);
        let offsets = column_offsets(50.0, &columns);
        assert_eq!(offsets[0], 50.0);
        for i in 0..columns.len() - 1 {
            assert_eq!(offsets[i + 1], offsets[i] + columns[i].width);
            assert!(offsets[i + 1] > offsets[i]);
        }
    }

    #[test]
    fn test_column_offsets_for_arbitrary_widths() {
        for widths in [[1.0; 7], [300.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0], [12.5, 7.25, 3.0, 99.0, 0.5, 1.0, 2.0]] {
            let columns = ColumnSpec::line_item_columns(&widths);
            let offsets = column_offsets(0.0, &columns);
            for i in 0..6 {
                assert_eq!(offsets[i + 1], offsets[i] + widths[i]);
            }
        }
    }

    #[test]
    fn test_row_height_respects_minimum() {
        let config = LayoutConfig::default();
        assert_eq!(row_height(0.0, &config), 30.0);
        assert_eq!(row_height(11.6, &config), 30.0);
        assert_eq!(row_height(34.8, &config), 44.8);
    }

    #[test]
    fn test_row_height_non_decreasing_in_measured_height() {
        let config = LayoutConfig::default();
        let mut previous = 0.0;
        for step in 0..100 {
            let height = row_height(step as f32 * 0.75, &config);
            assert!(height >= config.min_row_height);
            assert!(height >= previous);
            previous = height;
        }
    }

    #[test]
    fn test_rows_advance_by_measured_height() {
        let doc = build("quotation", &record(2), &company()).unwrap();
        let config = LayoutConfig::default();
        let mut backend = FixedHeightBackend {
            height: 40.0,
            inner: RecordingBackend::new(),
        };
        let instructions = layout(&doc, &config, &mut backend).unwrap();

        let rows: Vec<f32> = texts(&instructions)
            .iter()
            .filter(|r| r.text == "Widget")
            .map(|r| r.y)
            .collect();
        assert_eq!(rows.len(), 2);
        assert!((rows[1] - rows[0] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_header_and_rows_share_offsets() {
        let doc = build("quotation", &record(3), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        let header_xs: Vec<f32> = doc
            .table
            .columns
            .iter()
            .map(|c| find(&instructions, c.label).unwrap().x)
            .collect();
        let first_row_y = find(&instructions, "Widget").unwrap().y;
        let row_xs: Vec<f32> = texts(&instructions)
            .iter()
            .filter(|r| r.y == first_row_y && r.style.size == TABLE_FONT_SIZE)
            .map(|r| r.x)
            .collect();
        assert_eq!(header_xs, row_xs);
        assert_eq!(header_xs, column_offsets(50.0, &doc.table.columns));
    }

    #[test]
    fn test_table_styles_and_alignment() {
        let doc = build("quotation", &record(1), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        let item_header = find(&instructions, "Item").unwrap();
        assert_eq!(item_header.align, Align::Left);
        assert_eq!(item_header.style, TextStyle::bold(TABLE_FONT_SIZE));
        let qty_header = find(&instructions, "Qty").unwrap();
        assert_eq!(qty_header.align, Align::Right);

        let amount = find(&instructions, "100.00").unwrap();
        assert_eq!(amount.align, Align::Right);
        assert_eq!(amount.style, TextStyle::regular(TABLE_FONT_SIZE));
        assert!(find(&instructions, "10%").is_some());
    }

    #[test]
    fn test_rules_frame_the_table() {
        let doc = build("quotation", &record(1), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        let rules: Vec<&Rule> = instructions.iter().filter_map(DrawInstruction::as_line).collect();
        assert_eq!(rules.len(), 2);
        let header_y = find(&instructions, "Item").unwrap().y;
        let row_y = find(&instructions, "Widget").unwrap().y;
        let subtotal_y = find(&instructions, "Subtotal:").unwrap().y;
        assert!(rules[0].y1 > header_y && rules[0].y1 < row_y);
        assert!(rules[1].y1 > row_y && rules[1].y1 < subtotal_y);
        assert_eq!(rules[0].x2, 562.0);
    }

    #[test]
    fn test_absent_address_line_leaves_no_gap() {
        let doc = build("quotation", &record(1), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        let street = find(&instructions, "42 Main St").unwrap().y;
        let city = find(&instructions, "Springfield, IL 62701").unwrap().y;
        assert!((city - street - line_height(BODY_FONT_SIZE)).abs() < 1e-3);
    }

    #[test]
    fn test_totals_use_their_own_columns() {
        let doc = build("quotation", &record(1), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();
        let offsets = column_offsets(50.0, &doc.table.columns);

        let subtotal_y = find(&instructions, "Subtotal:").unwrap().y;
        let totals: Vec<&TextRun> = texts(&instructions)
            .into_iter()
            .filter(|r| r.y >= subtotal_y)
            .collect();
        assert_eq!(totals.len(), 6);

        for pair in totals.chunks(2) {
            let (label, value) = (pair[0], pair[1]);
            assert_eq!(label.x, 370.0);
            assert_eq!(value.x, 470.0);
            assert!(!offsets.contains(&label.x));
            assert!(!offsets.contains(&value.x));
            assert!(value.x + value.width <= 562.0);
        }
    }

    #[test]
    fn test_totals_columns_do_not_depend_on_table_widths() {
        let widths = [150.0, 50.0, 60.0, 60.0, 50.0, 60.0, 60.0];
        let doc = crate::document::build_with_columns("quotation", &record(1), &company(), &widths).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        assert_eq!(find(&instructions, "Total:").unwrap().x, 370.0);
        let total_value = texts(&instructions).last().copied().unwrap();
        assert_eq!(total_value.text, "220.00");
        assert_eq!(total_value.x, 470.0);
    }

    #[test]
    fn test_a4_page_keeps_totals_inside_margin() {
        let widths = [180.0, 40.0, 60.0, 60.0, 40.0, 50.0, 60.0];
        let doc = crate::document::build_with_columns("quotation", &record(1), &company(), &widths).unwrap();
        let config = LayoutConfig {
            page: PageMetrics::A4,
            ..LayoutConfig::default()
        };
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &config, &mut backend).unwrap();

        let right = config.page.content_bounds().right;
        let total_value = texts(&instructions).last().copied().unwrap();
        assert_eq!(total_value.text, "220.00");
        assert!(total_value.x + total_value.width <= right);
        let rules: Vec<&Rule> = instructions.iter().filter_map(DrawInstruction::as_line).collect();
        assert!(rules.iter().all(|r| r.x2 <= right));
    }

    #[test]
    fn test_conditional_blocks_share_spacing() {
        let mut record = record(1);
        record.notes = Some("Payment within 30 days.".to_string());
        record.banking = crate::model::BankingRecord {
            bank_name: Some("First Bank".to_string()),
            bank_branch: Some("Downtown".to_string()),
            account_number: Some("0012345".to_string()),
            account_name: Some("Acme Trading".to_string()),
            swift_code: Some("FBNKUS33".to_string()),
            aba_routing: Some("021000021".to_string()),
        };
        let doc = build("invoice", &record, &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap();

        let total_y = find(&instructions, "Total:").unwrap().y;
        let banking_y = find(&instructions, "Payment Information:").unwrap().y;
        let routing_y = find(&instructions, "ABA/Routing: 021000021").unwrap().y;
        let notes_y = find(&instructions, "Notes:").unwrap().y;

        assert!((banking_y - total_y - 40.0).abs() < 1e-3);
        assert!((notes_y - routing_y - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_overflow_fails_by_default() {
        let doc = build("quotation", &record(40), &company()).unwrap();
        let mut backend = RecordingBackend::new();
        let err = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap_err();
        assert!(matches!(err, RenderError::PageOverflow { .. }));
    }

    #[test]
    fn test_overflow_policy_draws_past_margin() {
        let doc = build("quotation", &record(40), &company()).unwrap();
        let config = LayoutConfig {
            page_break: PageBreakPolicy::Overflow,
            ..LayoutConfig::default()
        };
        let mut backend = RecordingBackend::new();
        let instructions = layout(&doc, &config, &mut backend).unwrap();

        let rows = texts(&instructions).iter().filter(|r| r.text == "Widget").count();
        assert_eq!(rows, 40);
        let last = find(&instructions, "Total:").unwrap();
        assert!(last.y > config.page.content_bounds().bottom);
    }

    #[test]
    fn test_table_wider_than_page_is_rejected() {
        let doc = crate::document::build_with_columns(
            "quotation",
            &record(1),
            &company(),
            &[200.0, 40.0, 70.0, 70.0, 40.0, 60.0, 70.0],
        )
        .unwrap();
        let mut backend = RecordingBackend::new();
        let err = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap_err();
        assert!(matches!(err, RenderError::TableTooWide { .. }));
        assert!(backend.instructions().is_empty());
    }

    #[test]
    fn test_zero_width_column_is_rejected() {
        let mut widths = DEFAULT_COLUMN_WIDTHS;
        widths[3] = 0.0;
        let doc = crate::document::build_with_columns("quotation", &record(1), &company(), &widths).unwrap();
        let mut backend = RecordingBackend::new();
        let err = layout(&doc, &LayoutConfig::default(), &mut backend).unwrap_err();
        assert_eq!(err, RenderError::InvalidColumn { index: 3, width: 0.0 });
    }

    #[test]
    fn test_small_page_overflows_in_header() {
        let doc = build("quotation", &record(1), &company()).unwrap();
        let config = LayoutConfig {
            page: PageMetrics {
                width: 612.0,
                height: 200.0,
                margin: 50.0,
            },
            ..LayoutConfig::default()
        };
        let mut backend = RecordingBackend::new();
        assert!(matches!(
            layout(&doc, &config, &mut backend),
            Err(RenderError::PageOverflow { .. })
        ));
    }
}
