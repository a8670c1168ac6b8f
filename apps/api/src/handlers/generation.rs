use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use lumina_application::{GenerationAction, SubmissionPolicy};
use lumina_domain::{
    AspectRatio, FormDraft, FormModel, GUIDANCE_RANGE, GenerationConfig, INFERENCE_STEPS_RANGE,
    ImageModel, NUM_OUTPUT_RANGE, OUTPUT_QUALITY_RANGE, OutputFormat,
};

use crate::dto::{
    FormSubmissionResponse, GenerationDefaultsResponse, GenerationOptionsResponse,
    OptionResponse, RecommendedStepsResponse,
};
use crate::error::ApiResult;
use crate::handlers::forms::submit_form;
use crate::state::AppState;

pub async fn generation_defaults_handler() -> Json<GenerationDefaultsResponse> {
    Json(GenerationDefaultsResponse {
        values: GenerationConfig::default_draft(),
    })
}

pub async fn generation_options_handler() -> Json<GenerationOptionsResponse> {
    Json(GenerationOptionsResponse {
        models: ImageModel::ALL
            .iter()
            .map(|model| option(model.as_str(), model.label()))
            .collect(),
        aspect_ratios: AspectRatio::ALL
            .iter()
            .map(|ratio| option(ratio.as_str(), ratio.as_str()))
            .collect(),
        output_formats: OutputFormat::ALL
            .iter()
            .map(|format| option(format.as_str(), format.label()))
            .collect(),
        guidance: GUIDANCE_RANGE.into(),
        num_output: NUM_OUTPUT_RANGE.into(),
        output_quality: OUTPUT_QUALITY_RANGE.into(),
        num_inference_steps: INFERENCE_STEPS_RANGE.into(),
        recommended_inference_steps: ImageModel::ALL
            .iter()
            .map(|model| {
                let steps = model.recommended_inference_steps();
                RecommendedStepsResponse {
                    model: model.as_str().to_owned(),
                    min: *steps.start(),
                    max: *steps.end(),
                }
            })
            .collect(),
    })
}

pub async fn generation_config_handler(
    State(state): State<AppState>,
    Json(draft): Json<FormDraft>,
) -> ApiResult<(StatusCode, Json<FormSubmissionResponse>)> {
    let submission = submit_form::<GenerationConfig>(
        &state,
        draft,
        Arc::new(GenerationAction::new(state.generation_sink.clone())),
        SubmissionPolicy::generation(),
    )
    .await?;

    Ok((submission.status_code(), Json(submission.response)))
}

fn option(value: &str, label: &str) -> OptionResponse {
    OptionResponse {
        value: value.to_owned(),
        label: label.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use lumina_application::GENERATION_FALLBACK_ERROR;
    use lumina_domain::{FieldValue, FormDraft};
    use lumina_infrastructure::{InMemoryAuthProvider, InMemoryGenerationQueue};

    use super::{
        generation_config_handler, generation_defaults_handler, generation_options_handler,
    };
    use crate::handlers::test_support::recording_state;

    #[tokio::test]
    async fn defaults_match_the_form_starting_values() {
        let Json(response) = generation_defaults_handler().await;

        assert_eq!(
            response.values.get("model"),
            Some(&FieldValue::from("black-forest-labs/flux-dev"))
        );
        assert_eq!(
            response.values.get("num_inference_steps").and_then(FieldValue::as_number),
            Some(28.0)
        );
    }

    #[tokio::test]
    async fn options_list_every_choice_with_recommended_steps() {
        let Json(response) = generation_options_handler().await;

        assert_eq!(response.models.len(), 2);
        assert_eq!(response.aspect_ratios.len(), 10);
        assert_eq!(response.output_formats.len(), 3);
        assert_eq!(response.guidance.step, 0.5);
        let schnell = response
            .recommended_inference_steps
            .iter()
            .find(|steps| steps.model == "black-forest-labs/flux-schnell");
        assert!(schnell.is_some_and(|steps| steps.min == 1 && steps.max == 4));
    }

    #[tokio::test]
    async fn valid_config_is_queued() {
        let queue = Arc::new(InMemoryGenerationQueue::new());
        let (state, _events) =
            recording_state(Arc::new(InMemoryAuthProvider::new()), queue.clone());
        let Json(defaults) = generation_defaults_handler().await;
        let draft = defaults.values.with("prompt", "a lighthouse at dusk");

        let result = generation_config_handler(State(state), Json(draft)).await;

        let Ok((status, Json(response))) = result else {
            panic!("config should respond");
        };
        assert_eq!(status, StatusCode::OK);
        assert!(response.success);
        assert_eq!(response.navigate_to, None);
        assert!(
            response
                .data
                .as_ref()
                .and_then(|data| data.get("request_id"))
                .is_some()
        );
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn out_of_range_values_are_rejected_before_queueing() {
        let queue = Arc::new(InMemoryGenerationQueue::new());
        let (state, _events) =
            recording_state(Arc::new(InMemoryAuthProvider::new()), queue.clone());
        let Json(defaults) = generation_defaults_handler().await;
        let draft: FormDraft = defaults
            .values
            .with("prompt", "a lighthouse at dusk")
            .with("num_output", 9.0)
            .with("model", "sdxl");

        let result = generation_config_handler(State(state), Json(draft)).await;

        let Ok((status, Json(response))) = result else {
            panic!("config should respond");
        };
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.field_errors.contains_key("num_output"));
        assert_eq!(
            response.field_errors.get("model").map(String::as_str),
            Some("Please select a supported model.")
        );
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn full_queue_reports_the_generation_fallback() {
        let queue = Arc::new(InMemoryGenerationQueue::with_capacity(1));
        let (state, _events) =
            recording_state(Arc::new(InMemoryAuthProvider::new()), queue.clone());
        let Json(defaults) = generation_defaults_handler().await;
        let draft = defaults.values.with("prompt", "a lighthouse at dusk");

        let first = generation_config_handler(State(state.clone()), Json(draft.clone())).await;
        let second = generation_config_handler(State(state), Json(draft)).await;

        assert!(first.is_ok_and(|(_, Json(response))| response.success));
        let Ok((status, Json(response))) = second else {
            panic!("config should respond");
        };
        assert_eq!(status, StatusCode::OK);
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some(GENERATION_FALLBACK_ERROR));
        assert_eq!(queue.len().await, 1);
    }
}
