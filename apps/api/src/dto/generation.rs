use lumina_domain::{FormDraft, NumericRange};
use serde::Serialize;
use ts_rs::TS;

/// Values the generation form starts with.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/generation-defaults-response.ts"
)]
pub struct GenerationDefaultsResponse {
    #[ts(type = "Record<string, string | number>")]
    pub values: FormDraft,
}

/// One selectable option.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/option-response.ts"
)]
pub struct OptionResponse {
    pub value: String,
    pub label: String,
}

/// Slider bounds.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/range-response.ts"
)]
pub struct RangeResponse {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl From<NumericRange> for RangeResponse {
    fn from(range: NumericRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
            step: range.step,
        }
    }
}

/// Step range a model is tuned for.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/recommended-steps-response.ts"
)]
pub struct RecommendedStepsResponse {
    pub model: String,
    pub min: u8,
    pub max: u8,
}

/// Option sets and numeric ranges of the generation form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/generation-options-response.ts"
)]
pub struct GenerationOptionsResponse {
    pub models: Vec<OptionResponse>,
    pub aspect_ratios: Vec<OptionResponse>,
    pub output_formats: Vec<OptionResponse>,
    pub guidance: RangeResponse,
    pub num_output: RangeResponse,
    pub output_quality: RangeResponse,
    pub num_inference_steps: RangeResponse,
    pub recommended_inference_steps: Vec<RecommendedStepsResponse>,
}
