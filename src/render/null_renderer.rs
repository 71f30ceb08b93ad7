use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless pipeline usage.
///
/// It still validates frame content so tests catch invalid geometry without a
/// drawing backend.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_primitive_count: usize,
    pub last_exportable_count: usize,
    pub frames_rendered: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.last_primitive_count = frame.len();
        self.last_exportable_count = frame.exportable().len();
        self.frames_rendered += 1;
        Ok(())
    }
}
