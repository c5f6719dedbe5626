/// Convenience result type used across blobtone.
pub type BlobtoneResult<T> = Result<T, BlobtoneError>;

/// Top-level error taxonomy used by generator, rasterizer and compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum BlobtoneError {
    /// Malformed shape or halftone parameters, rejected before any work begins.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A boundary path that cannot be validated or flattened.
    #[error("malformed boundary: {0}")]
    MalformedBoundary(String),

    /// A single compositor layer failed; wraps the underlying generation error.
    #[error("layer {layer} generation failed: {source}")]
    LayerGeneration {
        /// Index of the requested layer (0-based, before skipping).
        layer: usize,
        /// Underlying generator or rasterizer error.
        source: Box<BlobtoneError>,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Reference renderer precondition failures.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BlobtoneError {
    /// Build a [`BlobtoneError::InvalidParameters`] value.
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Build a [`BlobtoneError::MalformedBoundary`] value.
    pub fn malformed_boundary(msg: impl Into<String>) -> Self {
        Self::MalformedBoundary(msg.into())
    }

    /// Scope an error to one compositor layer.
    pub fn layer_generation(layer: usize, source: BlobtoneError) -> Self {
        Self::LayerGeneration {
            layer,
            source: Box::new(source),
        }
    }

    /// Build a [`BlobtoneError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`BlobtoneError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
