//! Declarative form schemas and the validator that interprets them.
//!
//! A schema is a list of fields, each with an ordered list of tagged
//! constraints, plus whole-form refinements. Validation is a pure function of
//! `(schema, draft)`: every field is checked independently, each field stops
//! at its first failing constraint, and refinements only run once every field
//! passed.

use std::collections::{BTreeMap, BTreeSet};

use lumina_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::draft::{FieldValue, FormDraft};
use crate::user::{is_complex_password, is_valid_email_shape};

/// Value kind accepted by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// Floating point number.
    Number,
}

impl FieldKind {
    fn accepts(self, value: &FieldValue) -> bool {
        match self {
            Self::Text => value.as_text().is_some(),
            Self::Number => value.as_number().is_some(),
        }
    }
}

/// Predicate applied to a present, correctly typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "argument", rename_all = "snake_case")]
pub enum Rule {
    /// Text has at least this many characters.
    MinLength(usize),
    /// Text has at most this many characters.
    MaxLength(usize),
    /// Text has the shape of an email address.
    Email,
    /// Text satisfies every password complexity requirement at once.
    PasswordComplexity,
    /// Number is greater than or equal to the bound.
    Min(f64),
    /// Number is less than or equal to the bound.
    Max(f64),
    /// Number has no fractional part.
    Integer,
    /// Text is one of the listed options.
    OneOf(Vec<String>),
}

impl Rule {
    /// Evaluates the rule. Values of the wrong kind never satisfy a rule.
    #[must_use]
    pub fn is_satisfied_by(&self, value: &FieldValue) -> bool {
        match self {
            Self::MinLength(min) => value
                .as_text()
                .is_some_and(|text| text.chars().count() >= *min),
            Self::MaxLength(max) => value
                .as_text()
                .is_some_and(|text| text.chars().count() <= *max),
            Self::Email => value.as_text().is_some_and(is_valid_email_shape),
            Self::PasswordComplexity => value.as_text().is_some_and(is_complex_password),
            Self::Min(min) => value.as_number().is_some_and(|number| number >= *min),
            Self::Max(max) => value.as_number().is_some_and(|number| number <= *max),
            Self::Integer => value.as_number().is_some_and(|number| number.fract() == 0.0),
            Self::OneOf(options) => value
                .as_text()
                .is_some_and(|text| options.iter().any(|option| option == text)),
        }
    }
}

/// A rule paired with the message shown when it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    rule: Rule,
    message: String,
}

impl FieldConstraint {
    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Declarative definition of a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    name: String,
    kind: FieldKind,
    required: bool,
    #[serde(default)]
    whitespace_is_blank: bool,
    required_message: String,
    constraints: Vec<FieldConstraint>,
}

impl FieldSchema {
    /// Starts an optional text field.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Text)
    }

    /// Starts an optional number field.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Number)
    }

    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let required_message = format!("{name} is required");
        Self {
            name,
            kind,
            required: false,
            whitespace_is_blank: false,
            required_message,
            constraints: Vec::new(),
        }
    }

    /// Marks the field as required. The message is also used when the value
    /// has the wrong kind.
    #[must_use]
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = true;
        self.required_message = message.into();
        self
    }

    /// Treats whitespace-only text as not filled in. By default only the
    /// empty string is.
    #[must_use]
    pub fn whitespace_is_blank(mut self) -> Self {
        self.whitespace_is_blank = true;
        self
    }

    /// Appends a constraint. Constraints run in the order they are added.
    #[must_use]
    pub fn rule(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.constraints.push(FieldConstraint {
            rule,
            message: message.into(),
        });
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    fn is_blank(&self, value: &FieldValue) -> bool {
        match value.as_text() {
            Some(text) if self.whitespace_is_blank => text.trim().is_empty(),
            _ => value.is_blank(),
        }
    }

    /// Checks one value and returns the first failure message, if any.
    fn check(&self, value: Option<&FieldValue>) -> Option<&str> {
        let value = match value {
            Some(value) if !self.is_blank(value) => value,
            _ if self.required => return Some(self.required_message.as_str()),
            _ => return None,
        };

        if !self.kind.accepts(value) {
            return Some(self.required_message.as_str());
        }

        self.constraints
            .iter()
            .find(|constraint| !constraint.rule.is_satisfied_by(value))
            .map(FieldConstraint::message)
    }
}

/// Whole-form rule spanning more than one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "refinement", rename_all = "snake_case")]
pub enum Refinement {
    /// `confirmation` must hold exactly the same value as `field`. Failures
    /// are reported on `confirmation`.
    FieldsMatch {
        /// Field holding the original value.
        field: String,
        /// Field that must repeat it.
        confirmation: String,
        /// Message attached to `confirmation` on mismatch.
        message: String,
    },
}

impl Refinement {
    fn referenced_fields(&self) -> [&str; 2] {
        match self {
            Self::FieldsMatch {
                field,
                confirmation,
                ..
            } => [field.as_str(), confirmation.as_str()],
        }
    }

    fn check(&self, draft: &FormDraft) -> Option<(&str, &str)> {
        match self {
            Self::FieldsMatch {
                field,
                confirmation,
                message,
            } => (draft.get(field) != draft.get(confirmation))
                .then_some((confirmation.as_str(), message.as_str())),
        }
    }
}

/// Field name to first error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error unless the field already has one.
    pub fn insert_first(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Returns the error for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether the field has an error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Names of every field with an error, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over `(field, message)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    /// Every field and refinement passed.
    Valid(T),
    /// At least one field failed; each failing field carries one message.
    Invalid(FieldErrors),
}

impl<T> ValidationResult<T> {
    /// Whether validation passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the field errors of an invalid result.
    #[must_use]
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }
}

/// Draft values that passed every check of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    values: BTreeMap<String, FieldValue>,
}

impl ValidatedDraft {
    /// Returns a validated text value.
    pub fn text(&self, field: &str) -> AppResult<&str> {
        self.values
            .get(field)
            .and_then(FieldValue::as_text)
            .ok_or_else(|| {
                AppError::Internal(format!("validated draft has no text value for '{field}'"))
            })
    }

    /// Returns a validated number.
    pub fn number(&self, field: &str) -> AppResult<f64> {
        self.values
            .get(field)
            .and_then(FieldValue::as_number)
            .ok_or_else(|| {
                AppError::Internal(format!("validated draft has no number for '{field}'"))
            })
    }

    /// Returns a validated whole number converted to the target integer type.
    pub fn whole_number<T>(&self, field: &str) -> AppResult<T>
    where
        T: TryFrom<i64>,
    {
        let number = self.number(field)?;
        if number.fract() != 0.0 || number < i64::MIN as f64 || number > i64::MAX as f64 {
            return Err(AppError::Internal(format!(
                "validated value for '{field}' is not a whole number"
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        T::try_from(number as i64).map_err(|_| {
            AppError::Internal(format!("validated value for '{field}' is out of range"))
        })
    }
}

/// Ordered set of field schemas plus whole-form refinements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
    refinements: Vec<Refinement>,
}

impl FormSchema {
    /// Creates a schema. Field names must be unique and refinements may only
    /// reference declared fields.
    pub fn new(fields: Vec<FieldSchema>, refinements: Vec<Refinement>) -> AppResult<Self> {
        let mut names = BTreeSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(AppError::Validation(
                    "form field name must not be empty".to_owned(),
                ));
            }
            if !names.insert(field.name.as_str()) {
                return Err(AppError::Validation(format!(
                    "duplicate form field '{}'",
                    field.name
                )));
            }
        }

        for refinement in &refinements {
            if let Some(unknown) = refinement
                .referenced_fields()
                .into_iter()
                .find(|name| !names.contains(name))
            {
                return Err(AppError::Validation(format!(
                    "refinement references unknown field '{unknown}'"
                )));
            }
        }

        Ok(Self {
            fields,
            refinements,
        })
    }

    /// Returns a field schema by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Runs per-field constraints, then refinements if every field passed.
    #[must_use]
    pub fn validate(&self, draft: &FormDraft) -> ValidationResult<ValidatedDraft> {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            if let Some(message) = field.check(draft.get(field.name())) {
                errors.insert_first(field.name(), message);
            }
        }

        if !errors.is_empty() {
            return ValidationResult::Invalid(errors);
        }

        for refinement in &self.refinements {
            if let Some((field, message)) = refinement.check(draft) {
                errors.insert_first(field, message);
            }
        }

        if !errors.is_empty() {
            return ValidationResult::Invalid(errors);
        }

        let values = self
            .fields
            .iter()
            .filter_map(|field| {
                draft
                    .get(field.name())
                    .filter(|value| !field.is_blank(value))
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect();

        ValidationResult::Valid(ValidatedDraft { values })
    }
}

/// A typed form whose values come out of a schema validation pass.
pub trait FormModel: Sized + Send + Sync + 'static {
    /// Stable form name used in logs and events.
    const FORM_NAME: &'static str;

    /// Builds the schema for this form.
    fn schema() -> AppResult<FormSchema>;

    /// Converts validated values into the typed model.
    fn from_validated(values: &ValidatedDraft) -> AppResult<Self>;

    /// Draft the form starts with when mounted.
    #[must_use]
    fn default_draft() -> FormDraft {
        FormDraft::new()
    }
}

/// Validates a draft against a model's schema and builds the typed model.
///
/// The outer `Result` only fails for defects in the schema or model
/// definition; user input problems are reported as `Invalid`.
pub fn validate_model<M: FormModel>(draft: &FormDraft) -> AppResult<ValidationResult<M>> {
    match M::schema()?.validate(draft) {
        ValidationResult::Valid(values) => M::from_validated(&values).map(ValidationResult::Valid),
        ValidationResult::Invalid(errors) => Ok(ValidationResult::Invalid(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        let schema = FormSchema::new(
            vec![
                FieldSchema::text("name")
                    .required("name is required")
                    .whitespace_is_blank()
                    .rule(Rule::MinLength(3), "name is too short")
                    .rule(Rule::MaxLength(5), "name is too long"),
                FieldSchema::number("count")
                    .required("count is required")
                    .rule(Rule::Integer, "count must be whole")
                    .rule(Rule::Min(1.0), "count should be at least 1")
                    .rule(Rule::Max(4.0), "count must be less than or equal to 4"),
                FieldSchema::text("nickname").rule(Rule::MinLength(2), "nickname is too short"),
                FieldSchema::text("secret").required("secret is required"),
                FieldSchema::text("secret_again").required("repeat the secret"),
            ],
            vec![Refinement::FieldsMatch {
                field: "secret".to_owned(),
                confirmation: "secret_again".to_owned(),
                message: "secrets differ".to_owned(),
            }],
        );
        match schema {
            Ok(schema) => schema,
            Err(error) => panic!("test schema should build: {error}"),
        }
    }

    fn valid_draft() -> FormDraft {
        FormDraft::new()
            .with("name", "abc")
            .with("count", 2.0)
            .with("secret", "s")
            .with("secret_again", "s")
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(schema().validate(&valid_draft()).is_valid());
        assert!(
            schema()
                .validate(&valid_draft().with("name", "abcde"))
                .is_valid()
        );

        let result = schema().validate(&valid_draft().with("name", "abcdef"));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("name")),
            Some("name is too long")
        );
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        for count in [1.0, 4.0] {
            assert!(
                schema()
                    .validate(&valid_draft().with("count", count))
                    .is_valid()
            );
        }

        let low = schema().validate(&valid_draft().with("count", 0.0));
        let high = schema().validate(&valid_draft().with("count", 5.0));
        assert_eq!(
            low.errors().and_then(|errors| errors.get("count")),
            Some("count should be at least 1")
        );
        assert_eq!(
            high.errors().and_then(|errors| errors.get("count")),
            Some("count must be less than or equal to 4")
        );
    }

    #[test]
    fn first_failing_constraint_wins() {
        let result = schema().validate(&valid_draft().with("count", 7.5));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("count")),
            Some("count must be whole")
        );
    }

    #[test]
    fn required_check_runs_before_other_constraints() {
        let result = schema().validate(&valid_draft().with("name", "  "));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("name")),
            Some("name is required")
        );
    }

    #[test]
    fn whitespace_is_a_value_unless_the_field_opts_in() {
        let draft = valid_draft()
            .with("secret", "   ")
            .with("secret_again", "   ");
        assert!(schema().validate(&draft).is_valid());

        let result = schema().validate(&valid_draft().with("secret", ""));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("secret")),
            Some("secret is required")
        );
    }

    #[test]
    fn wrong_kind_reports_required_message() {
        let result = schema().validate(&valid_draft().with("count", "two"));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("count")),
            Some("count is required")
        );
    }

    #[test]
    fn optional_field_skips_constraints_when_absent() {
        assert!(schema().validate(&valid_draft()).is_valid());

        let result = schema().validate(&valid_draft().with("nickname", "x"));
        assert_eq!(
            result.errors().and_then(|errors| errors.get("nickname")),
            Some("nickname is too short")
        );
    }

    #[test]
    fn all_fields_are_checked_independently() {
        let result = schema().validate(&FormDraft::new().with("count", 9.0));
        let fields: Vec<&str> = result
            .errors()
            .map(|errors| errors.fields().collect())
            .unwrap_or_default();
        assert_eq!(fields, vec!["count", "name", "secret", "secret_again"]);
    }

    #[test]
    fn refinement_error_lands_on_confirmation_field() {
        let result = schema().validate(&valid_draft().with("secret_again", "t"));
        let Some(errors) = result.errors() else {
            panic!("mismatch should be invalid");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("secret_again"), Some("secrets differ"));
        assert!(!errors.contains("secret"));
    }

    #[test]
    fn refinements_are_skipped_when_a_field_fails() {
        let draft = valid_draft().with("name", "x").with("secret_again", "t");
        let result = schema().validate(&draft);
        let Some(errors) = result.errors() else {
            panic!("short name should be invalid");
        };
        assert!(errors.contains("name"));
        assert!(!errors.contains("secret_again"));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = FormSchema::new(
            vec![FieldSchema::text("email"), FieldSchema::text("email")],
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn refinement_on_unknown_field_is_rejected() {
        let result = FormSchema::new(
            vec![FieldSchema::text("password")],
            vec![Refinement::FieldsMatch {
                field: "password".to_owned(),
                confirmation: "confirm".to_owned(),
                message: "no".to_owned(),
            }],
        );
        assert!(result.is_err());
    }

    #[test]
    fn one_of_accepts_only_listed_options() {
        let rule = Rule::OneOf(vec!["png".to_owned(), "jpg".to_owned()]);
        assert!(rule.is_satisfied_by(&FieldValue::from("png")));
        assert!(!rule.is_satisfied_by(&FieldValue::from("gif")));
        assert!(!rule.is_satisfied_by(&FieldValue::from(1.0)));
    }
}
