//! Presentation collaborators layered on top of the scene and interaction state.

pub mod listener;
pub mod tooltip;

pub use listener::InteractionListener;
pub use tooltip::{TooltipContent, TooltipContentRow};
