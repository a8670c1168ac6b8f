//! Image-generation request parameters.

use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

use lumina_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::draft::FormDraft;
use crate::form::{FieldSchema, FormModel, FormSchema, Rule, ValidatedDraft};

/// Field names of the generation configuration form.
pub mod generation_fields {
    /// Model identifier.
    pub const MODEL: &str = "model";
    /// Text prompt.
    pub const PROMPT: &str = "prompt";
    /// Prompt guidance scale.
    pub const GUIDANCE: &str = "guidance";
    /// Number of images to generate.
    pub const NUM_OUTPUT: &str = "num_output";
    /// Output aspect ratio.
    pub const ASPECT_RATIO: &str = "aspect_ratio";
    /// Output image format.
    pub const OUTPUT_FORMAT: &str = "output_format";
    /// Encoder quality.
    pub const OUTPUT_QUALITY: &str = "output_quality";
    /// Denoising steps.
    pub const NUM_INFERENCE_STEPS: &str = "num_inference_steps";
}

/// Inclusive numeric range with the step a slider moves by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericRange {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
    /// Slider increment.
    pub step: f64,
}

/// Guidance slider range.
pub const GUIDANCE_RANGE: NumericRange = NumericRange {
    min: 0.0,
    max: 10.0,
    step: 0.5,
};

/// Number-of-outputs input range.
pub const NUM_OUTPUT_RANGE: NumericRange = NumericRange {
    min: 1.0,
    max: 4.0,
    step: 1.0,
};

/// Output quality slider range.
pub const OUTPUT_QUALITY_RANGE: NumericRange = NumericRange {
    min: 50.0,
    max: 100.0,
    step: 1.0,
};

/// Inference steps slider range.
pub const INFERENCE_STEPS_RANGE: NumericRange = NumericRange {
    min: 1.0,
    max: 50.0,
    step: 1.0,
};

/// Supported generation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageModel {
    /// Flux Dev, quality oriented.
    #[serde(rename = "black-forest-labs/flux-dev")]
    FluxDev,
    /// Flux Schnell, speed oriented.
    #[serde(rename = "black-forest-labs/flux-schnell")]
    FluxSchnell,
}

impl ImageModel {
    /// Every supported model in display order.
    pub const ALL: [Self; 2] = [Self::FluxDev, Self::FluxSchnell];

    /// Returns the model identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FluxDev => "black-forest-labs/flux-dev",
            Self::FluxSchnell => "black-forest-labs/flux-schnell",
        }
    }

    /// Returns the human-friendly name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FluxDev => "Flux Dev",
            Self::FluxSchnell => "Flux Schnell",
        }
    }

    /// Inference step range the model is tuned for.
    #[must_use]
    pub fn recommended_inference_steps(&self) -> RangeInclusive<u8> {
        match self {
            Self::FluxDev => 28..=50,
            Self::FluxSchnell => 1..=4,
        }
    }
}

impl FromStr for ImageModel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown image model '{value}'")))
    }
}

impl Display for ImageModel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Supported output aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 16:9
    #[serde(rename = "16:9")]
    Landscape16x9,
    /// 9:16
    #[serde(rename = "9:16")]
    Portrait9x16,
    /// 21:9
    #[serde(rename = "21:9")]
    Landscape21x9,
    /// 9:21
    #[serde(rename = "9:21")]
    Portrait9x21,
    /// 4:5
    #[serde(rename = "4:5")]
    Portrait4x5,
    /// 5:4
    #[serde(rename = "5:4")]
    Landscape5x4,
    /// 4:3
    #[serde(rename = "4:3")]
    Landscape4x3,
    /// 3:4
    #[serde(rename = "3:4")]
    Portrait3x4,
    /// 2:3
    #[serde(rename = "2:3")]
    Portrait2x3,
}

impl AspectRatio {
    /// Every supported ratio in display order.
    pub const ALL: [Self; 10] = [
        Self::Square,
        Self::Landscape16x9,
        Self::Portrait9x16,
        Self::Landscape21x9,
        Self::Portrait9x21,
        Self::Portrait4x5,
        Self::Landscape5x4,
        Self::Landscape4x3,
        Self::Portrait3x4,
        Self::Portrait2x3,
    ];

    /// Returns the `w:h` identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape16x9 => "16:9",
            Self::Portrait9x16 => "9:16",
            Self::Landscape21x9 => "21:9",
            Self::Portrait9x21 => "9:21",
            Self::Portrait4x5 => "4:5",
            Self::Landscape5x4 => "5:4",
            Self::Landscape4x3 => "4:3",
            Self::Portrait3x4 => "3:4",
            Self::Portrait2x3 => "2:3",
        }
    }
}

impl FromStr for AspectRatio {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown aspect ratio '{value}'")))
    }
}

impl Display for AspectRatio {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Supported output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// WebP
    Webp,
    /// PNG
    Png,
    /// JPEG
    Jpg,
}

impl OutputFormat {
    /// Every supported format in display order.
    pub const ALL: [Self; 3] = [Self::Webp, Self::Png, Self::Jpg];

    /// Returns the format identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    /// Returns the human-friendly name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Webp => "WebP",
            Self::Png => "PNG",
            Self::Jpg => "JPG",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown output format '{value}'")))
    }
}

impl Display for OutputFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated parameters of one image-generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    model: ImageModel,
    prompt: NonEmptyString,
    guidance: f64,
    num_output: u8,
    aspect_ratio: AspectRatio,
    output_format: OutputFormat,
    output_quality: u8,
    num_inference_steps: u8,
}

impl GenerationConfig {
    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> ImageModel {
        self.model
    }

    /// Returns the prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.prompt.as_str()
    }

    /// Returns the guidance scale.
    #[must_use]
    pub fn guidance(&self) -> f64 {
        self.guidance
    }

    /// Returns the number of images to generate.
    #[must_use]
    pub fn num_output(&self) -> u8 {
        self.num_output
    }

    /// Returns the aspect ratio.
    #[must_use]
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Returns the output format.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Returns the output quality.
    #[must_use]
    pub fn output_quality(&self) -> u8 {
        self.output_quality
    }

    /// Returns the number of denoising steps.
    #[must_use]
    pub fn num_inference_steps(&self) -> u8 {
        self.num_inference_steps
    }

    /// Non-blocking hints about settings that are valid but unusual for the
    /// selected model.
    #[must_use]
    pub fn advisories(&self) -> Vec<String> {
        let recommended = self.model.recommended_inference_steps();
        if recommended.contains(&self.num_inference_steps) {
            return Vec::new();
        }

        vec![format!(
            "{} works best with {}-{} inference steps.",
            self.model.label(),
            recommended.start(),
            recommended.end()
        )]
    }
}

fn option_values<T, const N: usize>(options: [T; N], as_str: fn(&T) -> &'static str) -> Vec<String> {
    options
        .iter()
        .map(|option| as_str(option).to_owned())
        .collect()
}

fn bounded_number(
    name: &str,
    required: &str,
    label: &str,
    range: NumericRange,
    whole: bool,
) -> FieldSchema {
    let mut field = FieldSchema::number(name).required(required);
    if whole {
        field = field.rule(Rule::Integer, format!("{label} must be a whole number."));
    }

    field
        .rule(
            Rule::Min(range.min),
            format!("{label} should be at least {}.", range.min),
        )
        .rule(
            Rule::Max(range.max),
            format!("{label} must be less than or equal to {}.", range.max),
        )
}

impl FormModel for GenerationConfig {
    const FORM_NAME: &'static str = "generation";

    fn schema() -> AppResult<FormSchema> {
        use generation_fields as fields;

        FormSchema::new(
            vec![
                FieldSchema::text(fields::MODEL)
                    .required("Model is required!")
                    .rule(
                        Rule::OneOf(option_values(ImageModel::ALL, ImageModel::as_str)),
                        "Please select a supported model.",
                    ),
                FieldSchema::text(fields::PROMPT)
                    .required("Prompt is required!")
                    .whitespace_is_blank(),
                bounded_number(
                    fields::GUIDANCE,
                    "Guidance scale is required!",
                    "Guidance",
                    GUIDANCE_RANGE,
                    false,
                ),
                bounded_number(
                    fields::NUM_OUTPUT,
                    "Number of outputs is required!",
                    "Number of outputs",
                    NUM_OUTPUT_RANGE,
                    true,
                ),
                FieldSchema::text(fields::ASPECT_RATIO)
                    .required("Aspect ratio is required!")
                    .rule(
                        Rule::OneOf(option_values(AspectRatio::ALL, AspectRatio::as_str)),
                        "Please select a supported aspect ratio.",
                    ),
                FieldSchema::text(fields::OUTPUT_FORMAT)
                    .required("Output format is required!")
                    .rule(
                        Rule::OneOf(option_values(OutputFormat::ALL, OutputFormat::as_str)),
                        "Please select a supported output format.",
                    ),
                bounded_number(
                    fields::OUTPUT_QUALITY,
                    "Output quality is required!",
                    "Output quality",
                    OUTPUT_QUALITY_RANGE,
                    true,
                ),
                bounded_number(
                    fields::NUM_INFERENCE_STEPS,
                    "Inference steps are required!",
                    "Inference steps",
                    INFERENCE_STEPS_RANGE,
                    true,
                ),
            ],
            Vec::new(),
        )
    }

    fn from_validated(values: &ValidatedDraft) -> AppResult<Self> {
        use generation_fields as fields;

        Ok(Self {
            model: values.text(fields::MODEL)?.parse()?,
            prompt: NonEmptyString::new(values.text(fields::PROMPT)?)?,
            guidance: values.number(fields::GUIDANCE)?,
            num_output: values.whole_number(fields::NUM_OUTPUT)?,
            aspect_ratio: values.text(fields::ASPECT_RATIO)?.parse()?,
            output_format: values.text(fields::OUTPUT_FORMAT)?.parse()?,
            output_quality: values.whole_number(fields::OUTPUT_QUALITY)?,
            num_inference_steps: values.whole_number(fields::NUM_INFERENCE_STEPS)?,
        })
    }

    fn default_draft() -> FormDraft {
        use generation_fields as fields;

        FormDraft::new()
            .with(fields::MODEL, ImageModel::FluxDev.as_str())
            .with(fields::PROMPT, "")
            .with(fields::GUIDANCE, 3.5)
            .with(fields::NUM_OUTPUT, 1.0)
            .with(fields::OUTPUT_FORMAT, OutputFormat::Jpg.as_str())
            .with(fields::ASPECT_RATIO, AspectRatio::Square.as_str())
            .with(fields::OUTPUT_QUALITY, 80.0)
            .with(fields::NUM_INFERENCE_STEPS, 28.0)
    }
}
