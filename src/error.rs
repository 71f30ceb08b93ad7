use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    /// A configured field points at a missing component or one of the wrong kind.
    #[error("invalid chart configuration: {0}")]
    Configuration(String),

    /// The configuration is well-formed but the chart cannot give it a meaning.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ChartError {
    /// Returns `true` for errors that must abort the render pass.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnsupportedCombination(_))
    }
}
