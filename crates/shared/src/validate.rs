use std::fmt;

use crate::{
    domain::{
        Background, GenerationRequest, ImageQuality, ImageSize, OutputFormat, MAX_PROMPT_CHARS,
    },
    error::{Field, ValidationError},
    protocol::GenerateImageRequest,
};

/// How unrecognized input is resolved. The client runs `AutoCorrect` before
/// submitting; the server re-validates the same payload in `Strict` mode and
/// rejects anything the client should already have fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    AutoCorrect,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationNotice {
    FormatSwitchedForTransparency,
}

impl fmt::Display for ValidationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationNotice::FormatSwitchedForTransparency => {
                write!(f, "Switched format to PNG for transparent background.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub request: GenerationRequest,
    pub notice: Option<ValidationNotice>,
}

/// Normalizes and validates a raw wire request. Pure and deterministic, so
/// both sides of the network boundary run the identical logic.
pub fn validate(
    raw: &GenerateImageRequest,
    mode: ValidationMode,
) -> Result<Validated, ValidationError> {
    let prompt = raw.prompt.trim();
    if prompt.is_empty() {
        return Err(ValidationError::EmptyPrompt);
    }
    let prompt = truncate_chars(prompt, MAX_PROMPT_CHARS);

    let size = parse_enum_field(&raw.size, ImageSize::parse, Field::Size, mode)?;
    let quality = parse_enum_field(&raw.quality, ImageQuality::parse, Field::Quality, mode)?;
    let background = parse_enum_field(&raw.background, Background::parse, Field::Background, mode)?;
    let mut output_format =
        parse_enum_field(&raw.output_format, OutputFormat::parse, Field::OutputFormat, mode)?;

    let mut notice = None;
    if background == Background::Transparent && !output_format.supports_transparency() {
        match mode {
            ValidationMode::AutoCorrect => {
                output_format = OutputFormat::Png;
                notice = Some(ValidationNotice::FormatSwitchedForTransparency);
            }
            ValidationMode::Strict => return Err(ValidationError::IncompatibleParameters),
        }
    }

    Ok(Validated {
        request: GenerationRequest {
            prompt,
            size,
            quality,
            background,
            output_format,
        },
        notice,
    })
}

fn parse_enum_field<T: Default>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    field: Field,
    mode: ValidationMode,
) -> Result<T, ValidationError> {
    match parse(raw.trim()) {
        Some(value) => Ok(value),
        None => match mode {
            ValidationMode::AutoCorrect => Ok(T::default()),
            ValidationMode::Strict => Err(ValidationError::InvalidParameter(field)),
        },
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        prompt: &str,
        size: &str,
        quality: &str,
        background: &str,
        output_format: &str,
    ) -> GenerateImageRequest {
        GenerateImageRequest {
            prompt: prompt.to_string(),
            size: size.to_string(),
            quality: quality.to_string(),
            background: background.to_string(),
            output_format: output_format.to_string(),
        }
    }

    #[test]
    fn auto_correct_rewrites_jpeg_under_transparent_background() {
        let validated = validate(
            &raw("a red balloon", "1024x1024", "auto", "transparent", "jpeg"),
            ValidationMode::AutoCorrect,
        )
        .expect("valid");

        assert_eq!(validated.request.output_format, OutputFormat::Png);
        assert_eq!(
            validated.notice,
            Some(ValidationNotice::FormatSwitchedForTransparency)
        );
        assert_eq!(
            validated.notice.expect("notice").to_string(),
            "Switched format to PNG for transparent background."
        );
    }

    #[test]
    fn strict_rejects_jpeg_under_transparent_background() {
        let err = validate(
            &raw("a red balloon", "1024x1024", "auto", "transparent", "jpeg"),
            ValidationMode::Strict,
        )
        .expect_err("incompatible");

        assert_eq!(err, ValidationError::IncompatibleParameters);
        assert_eq!(
            err.to_string(),
            "Transparent background requires png or webp."
        );
    }

    #[test]
    fn transparent_webp_passes_both_modes() {
        for mode in [ValidationMode::AutoCorrect, ValidationMode::Strict] {
            let validated =
                validate(&raw("a ghost", "auto", "auto", "transparent", "webp"), mode)
                    .expect("valid");
            assert_eq!(validated.request.output_format, OutputFormat::Webp);
            assert!(validated.notice.is_none());
        }
    }

    #[test]
    fn empty_prompt_is_rejected_in_both_modes() {
        for mode in [ValidationMode::AutoCorrect, ValidationMode::Strict] {
            let err = validate(&raw("   \n\t ", "auto", "auto", "auto", "png"), mode)
                .expect_err("empty prompt");
            assert_eq!(err, ValidationError::EmptyPrompt);
            assert_eq!(err.to_string(), "Prompt is required.");
        }
    }

    #[test]
    fn auto_correct_defaults_blank_and_unknown_fields() {
        let validated = validate(
            &raw("a lighthouse", "", "ultra", "", "gif"),
            ValidationMode::AutoCorrect,
        )
        .expect("valid");

        assert_eq!(validated.request.size, ImageSize::Square1024);
        assert_eq!(validated.request.quality, ImageQuality::Auto);
        assert_eq!(validated.request.background, Background::Auto);
        assert_eq!(validated.request.output_format, OutputFormat::Png);
    }

    #[test]
    fn strict_rejects_each_unknown_field_with_its_own_message() {
        let cases = [
            (raw("p", "huge", "auto", "auto", "png"), "Invalid size."),
            (raw("p", "auto", "ultra", "auto", "png"), "Invalid quality."),
            (raw("p", "auto", "auto", "none", "png"), "Invalid background."),
            (raw("p", "auto", "auto", "auto", "gif"), "Invalid output_format."),
        ];
        for (request, message) in cases {
            let err = validate(&request, ValidationMode::Strict).expect_err("invalid field");
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn strict_rejects_missing_fields_instead_of_defaulting() {
        let err = validate(
            &GenerateImageRequest {
                prompt: "a lighthouse".to_string(),
                ..GenerateImageRequest::default()
            },
            ValidationMode::Strict,
        )
        .expect_err("missing fields");
        assert_eq!(err, ValidationError::InvalidParameter(Field::Size));
    }

    #[test]
    fn prompt_is_trimmed_and_capped() {
        let long = "x".repeat(MAX_PROMPT_CHARS + 50);
        let validated = validate(
            &raw(&format!("  {long}  "), "auto", "auto", "auto", "png"),
            ValidationMode::AutoCorrect,
        )
        .expect("valid");
        assert_eq!(validated.request.prompt.chars().count(), MAX_PROMPT_CHARS);
        assert!(!validated.request.prompt.starts_with(' '));
    }

    #[test]
    fn validation_is_deterministic() {
        let request = raw("a red balloon", "1536x1024", "high", "opaque", "webp");
        let first = validate(&request, ValidationMode::Strict).expect("valid");
        let second = validate(&request, ValidationMode::Strict).expect("valid");
        assert_eq!(first, second);
    }
}
