use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Size,
    Quality,
    Background,
    OutputFormat,
}

impl Field {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Field::Size => "size",
            Field::Quality => "quality",
            Field::Background => "background",
            Field::OutputFormat => "output_format",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt is required.")]
    EmptyPrompt,
    #[error("Invalid {}.", .0.wire_name())]
    InvalidParameter(Field),
    #[error("Transparent background requires png or webp.")]
    IncompatibleParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
