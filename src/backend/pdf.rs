use printpdf::*;

use crate::backend::{Align, FontStyle, RenderBackend, Rule, TextRun, TextStyle};
use crate::config::PageMetrics;
use crate::error::RenderError;
use crate::text;

const PT_TO_MM: f32 = 25.4 / 72.0;

/// Distance from the top of a Helvetica line to its baseline, per point of size.
const ASCENT: f32 = 0.718;

const RULE_THICKNESS: f32 = 0.5;

fn mm(pt: f32) -> Mm {
    Mm(pt * PT_TO_MM)
}

/// Single-page PDF output through `printpdf`, using the built-in Helvetica faces.
pub struct PrintPdfBackend {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font_regular: IndirectFontRef,
    font_bold: IndirectFontRef,
    page: PageMetrics,
}

impl PrintPdfBackend {
    pub fn new(title: &str, page: PageMetrics) -> Result<Self, RenderError> {
        let (doc, page1, layer1) = PdfDocument::new(title, mm(page.width), mm(page.height), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);

        let font_regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let line_color = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));
        layer.set_outline_color(line_color);
        layer.set_outline_thickness(RULE_THICKNESS);

        Ok(Self {
            doc,
            layer,
            font_regular,
            font_bold,
            page,
        })
    }

    fn font(&self, font: FontStyle) -> &IndirectFontRef {
        match font {
            FontStyle::Regular => &self.font_regular,
            FontStyle::Bold => &self.font_bold,
        }
    }

    // Top-down layout coordinates to PDF's bottom-up space.
    fn flip(&self, y: f32) -> f32 {
        self.page.height - y
    }
}

impl RenderBackend for PrintPdfBackend {
    fn measure_text_height(&self, text: &str, width: f32, style: TextStyle) -> Result<f32, RenderError> {
        Ok(text::wrapped_height(text, width, style))
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError> {
        let size = run.style.size;
        let line_height = text::line_height(size);

        for (i, line) in text::wrap(&run.text, run.width, run.style).iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let x = match run.align {
                Align::Left => run.x,
                Align::Center => run.x + (run.width - text::text_width(line, run.style)) / 2.0,
                Align::Right => run.x + run.width - text::text_width(line, run.style),
            };
            let baseline = run.y + i as f32 * line_height + size * ASCENT;

            self.layer.use_text(
                line.as_str(),
                size,
                mm(x),
                mm(self.flip(baseline)),
                self.font(run.style.font),
            );
        }
        Ok(())
    }

    fn draw_line(&mut self, rule: &Rule) -> Result<(), RenderError> {
        let points = vec![
            (Point::new(mm(rule.x1), mm(self.flip(rule.y1))), false),
            (Point::new(mm(rule.x2), mm(self.flip(rule.y2))), false),
        ];
        let line = Line {
            points,
            is_closed: false,
        };
        self.layer.add_line(line);
        Ok(())
    }

    fn finalize(self) -> Result<Vec<u8>, RenderError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| RenderError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produces_pdf_bytes() {
        let mut backend = PrintPdfBackend::new("Test", PageMetrics::default()).unwrap();
        backend
            .draw_text(&TextRun {
                text: "QUOTATION".to_string(),
                x: 50.0,
                y: 50.0,
                width: 512.0,
                align: Align::Center,
                style: TextStyle::bold(20.0),
            })
            .unwrap();
        backend
            .draw_line(&Rule { x1: 50.0, y1: 100.0, x2: 562.0, y2: 100.0 })
            .unwrap();

        let bytes = backend.finalize().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
