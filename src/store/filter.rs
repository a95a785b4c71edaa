use serde_json::Value;

use crate::error::{PlanError, Result};
use crate::store::{Document, ID_FIELD};

/// Equality filter over document fields.
///
/// A key of the form `<array>.<field>` matches when any object element of
/// `<array>` has `<field>` equal to the expected value. Only one level of
/// dotting into an array is understood; nested objects are not traversed.
///
/// An expected `null` matches both an explicit `null` and an absent field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    pub fn eq(mut self, key: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), expected.into()));
        self
    }

    /// Build a filter from a flat JSON object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(PlanError::InvalidUpdate(format!(
                "filter must be an object, got {value}"
            )));
        };
        Ok(Self {
            conditions: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|(key, expected)| match key.split_once('.') {
            Some((array, field)) => element_matches(doc.get(array), field, expected),
            None => field_matches(doc.get(key), expected),
        })
    }

    /// The condition this filter places on elements of `array`, as
    /// `(field, expected)`. Used to resolve positional update paths.
    pub fn element_condition(&self, array: &str) -> Option<(&str, &Value)> {
        self.conditions.iter().find_map(|(key, expected)| {
            let (prefix, field) = key.split_once('.')?;
            (prefix == array).then_some((field, expected))
        })
    }
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (None | Some(Value::Null), Value::Null) => true,
        (Some(actual), expected) => actual == expected,
        (None, _) => false,
    }
}

fn element_matches(container: Option<&Value>, field: &str, expected: &Value) -> bool {
    match container {
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| item_field_matches(item, field, expected)),
        _ => field_matches(None, expected),
    }
}

/// True when `item` is an object whose `field` equals `expected`.
pub(crate) fn item_field_matches(item: &Value, field: &str, expected: &Value) -> bool {
    item.as_object()
        .is_some_and(|obj| field_matches(obj.get(field), expected))
}
