use crate::backend::{DrawInstruction, RenderBackend, Rule, TextRun, TextStyle};
use crate::error::RenderError;
use crate::text;

/// Backend that keeps the instructions instead of encoding a page.
///
/// Measurement uses the same Helvetica metrics as [`PrintPdfBackend`], so
/// a layout recorded here matches the one written to PDF. `finalize`
/// returns the instructions as JSON.
///
/// [`PrintPdfBackend`]: crate::backend::PrintPdfBackend
#[derive(Debug, Default)]
pub struct RecordingBackend {
    instructions: Vec<DrawInstruction>,
    fail_after: Option<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `draws` text/line calls, then fail every call after that.
    pub fn failing_after(draws: usize) -> Self {
        Self {
            instructions: Vec::new(),
            fail_after: Some(draws),
        }
    }

    pub fn instructions(&self) -> &[DrawInstruction] {
        &self.instructions
    }

    fn record(&mut self, instruction: DrawInstruction) -> Result<(), RenderError> {
        if let Some(limit) = self.fail_after {
            if self.instructions.len() >= limit {
                return Err(RenderError::Backend(format!(
                    "recording backend refused draw call {}",
                    limit + 1
                )));
            }
        }
        self.instructions.push(instruction);
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn measure_text_height(&self, text: &str, width: f32, style: TextStyle) -> Result<f32, RenderError> {
        Ok(text::wrapped_height(text, width, style))
    }

    fn draw_text(&mut self, run: &TextRun) -> Result<(), RenderError> {
        self.record(DrawInstruction::Text(run.clone()))
    }

    fn draw_line(&mut self, rule: &Rule) -> Result<(), RenderError> {
        self.record(DrawInstruction::Line(*rule))
    }

    fn finalize(self) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec_pretty(&self.instructions).map_err(|e| RenderError::Backend(e.to_string()))
    }
}
