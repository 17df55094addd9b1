use serde::{Deserialize, Serialize};

pub const MAX_PROMPT_CHARS: usize = 32_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageSize {
    #[serde(rename = "auto")]
    Auto,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1536x1024")]
    Landscape1536,
    #[serde(rename = "1024x1536")]
    Portrait1536,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Auto => "auto",
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Landscape1536 => "1536x1024",
            ImageSize::Portrait1536 => "1024x1536",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ImageSize::Auto),
            "1024x1024" => Some(ImageSize::Square1024),
            "1536x1024" => Some(ImageSize::Landscape1536),
            "1024x1536" => Some(ImageSize::Portrait1536),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    #[default]
    Auto,
    High,
    Medium,
    Low,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Auto => "auto",
            ImageQuality::High => "high",
            ImageQuality::Medium => "medium",
            ImageQuality::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ImageQuality::Auto),
            "high" => Some(ImageQuality::High),
            "medium" => Some(ImageQuality::Medium),
            "low" => Some(ImageQuality::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    #[default]
    Auto,
    Opaque,
    Transparent,
}

impl Background {
    pub fn as_str(&self) -> &'static str {
        match self {
            Background::Auto => "auto",
            Background::Opaque => "opaque",
            Background::Transparent => "transparent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Background::Auto),
            "opaque" => Some(Background::Opaque),
            "transparent" => Some(Background::Transparent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "png" => Some(OutputFormat::Png),
            "jpeg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    // jpeg downloads conventionally use .jpg
    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn supports_transparency(&self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub quality: ImageQuality,
    pub background: Background,
    pub output_format: OutputFormat,
}
