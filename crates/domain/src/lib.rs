//! Form schemas, typed form models, and their invariants.

#![forbid(unsafe_code)]

mod auth_form;
mod draft;
mod form;
mod generation;
mod outcome;
mod user;

pub use auth_form::{
    LoginCredentials, PASSWORD_COMPLEXITY_MESSAGE, PASSWORD_MISMATCH_MESSAGE, SignUpCredentials,
    auth_fields,
};
pub use draft::{FieldValue, FormDraft};
pub use form::{
    FieldErrors, FieldSchema, FormModel, FormSchema, Refinement, Rule, ValidatedDraft,
    ValidationResult, validate_model,
};
pub use generation::{
    AspectRatio, GUIDANCE_RANGE, GenerationConfig, INFERENCE_STEPS_RANGE, ImageModel,
    NUM_OUTPUT_RANGE, NumericRange, OUTPUT_QUALITY_RANGE, OutputFormat, generation_fields,
};
pub use outcome::SubmissionOutcome;
pub use user::{
    EmailAddress, PASSWORD_MIN_LENGTH, PASSWORD_SYMBOLS, is_complex_password,
    is_valid_email_shape,
};
