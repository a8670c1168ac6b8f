use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw value of a single form field as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text input, select, or textarea value.
    Text(String),
    /// Numeric input or slider value.
    Number(f64),
}

impl FieldValue {
    /// Returns the text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            Self::Number(_) => None,
        }
    }

    /// Returns the numeric payload, if this is a finite number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    /// Whether the value counts as "not filled in" for required checks.
    /// Only the empty string does; whitespace is a value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// In-progress, possibly invalid values of one form keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDraft {
    values: BTreeMap<String, FieldValue>,
}

impl FormDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the draft with one more value set.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets or replaces the value of a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// Clears the value of a field.
    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    /// Returns the current value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Iterates over all values in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values
            .iter()
            .map(|(field, value)| (field.as_str(), value))
    }

    /// Number of fields that carry a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormDraft
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, FormDraft};

    #[test]
    fn json_numbers_and_strings_map_to_field_values() {
        let draft = serde_json::from_value::<FormDraft>(serde_json::json!({
            "prompt": "a lighthouse at dusk",
            "num_output": 2,
            "guidance": 3.5,
        }));

        let Ok(draft) = draft else {
            panic!("draft should deserialize");
        };
        assert_eq!(draft.get("num_output"), Some(&FieldValue::Number(2.0)));
        assert_eq!(draft.get("guidance"), Some(&FieldValue::Number(3.5)));
        assert_eq!(
            draft.get("prompt").and_then(FieldValue::as_text),
            Some("a lighthouse at dusk")
        );
    }

    #[test]
    fn only_empty_text_is_blank() {
        assert!(FieldValue::from("").is_blank());
        assert!(!FieldValue::from("   ").is_blank());
        assert!(!FieldValue::from(0.0).is_blank());
    }
}
