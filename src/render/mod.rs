mod frame;
mod keyed_engine;
mod null_renderer;
mod primitives;
pub mod transition;

pub use frame::RenderFrame;
pub use keyed_engine::{ElementPhase, KeyedRenderEngine, RenderDiff};
pub use null_renderer::NullRenderer;
pub use primitives::{Color, Paint, Primitive, Shape, TextHAlign};
pub use transition::{Easing, TransitionOptions, Tween};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from chart domain and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
