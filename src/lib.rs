//! obs-charts: render data pipeline for observation charts.
//!
//! Observations and component metadata go in; a deterministic, keyed
//! [`api::ChartScene`] comes out. The crate keeps a strict split between data
//! preparation and variable binding (`core`), scene construction (`api`),
//! keyed animated rendering (`render`) and pointer hit testing
//! (`interaction`). Drawing itself is delegated to a [`render::Renderer`].

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartInputs, ChartPipeline, ChartScene, PipelineConfig, compute_render_data};
pub use error::{ChartError, ChartResult};
