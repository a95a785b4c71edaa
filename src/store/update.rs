use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::ids;
use crate::store::filter::{Filter, item_field_matches};
use crate::store::{Document, ID_FIELD};

/// Target of a set assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    /// A top-level field.
    Field(String),
    /// `<array>.$.<field>`: a field inside the array element selected by the
    /// filter's `<array>.<key>` condition.
    Positional { array: String, field: String },
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        if let Some((array, rest)) = path.split_once(".$.")
            && !array.is_empty()
            && !rest.is_empty()
        {
            return Self::Positional {
                array: array.to_string(),
                field: rest.to_string(),
            };
        }
        Self::Field(path.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: FieldPath,
    pub value: Value,
}

/// A partial mutation applied to one located document.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace fields, shallowly or through a positional path.
    Set(Vec<Assignment>),
    /// Append an element to an array field.
    Push { field: String, element: Value },
    /// Remove every element of an array field whose `_id` equals `id`.
    Pull { field: String, id: String },
}

impl Update {
    /// Shallow merge of `fields` over the document.
    pub fn merge(fields: Document) -> Self {
        Self::Set(
            fields
                .into_iter()
                .map(|(key, value)| Assignment {
                    path: FieldPath::Field(key),
                    value,
                })
                .collect(),
        )
    }

    /// Set assignments keyed by path strings (`title`, `tasks.$.completed`).
    pub fn set<K, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Set(
            pairs
                .into_iter()
                .map(|(path, value)| Assignment {
                    path: FieldPath::parse(path.as_ref()),
                    value,
                })
                .collect(),
        )
    }

    pub fn push(field: impl Into<String>, element: Value) -> Self {
        Self::Push {
            field: field.into(),
            element,
        }
    }

    pub fn pull(field: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Pull {
            field: field.into(),
            id: id.into(),
        }
    }

    /// Parse operator syntax: `{"$set": {..}}`, `{"$push": {field: elem}}`,
    /// `{"$pull": {field: {"_id": id}}}`, or a plain object to merge.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(invalid(format!("update must be an object, got {value}")));
        };

        let operators = map.keys().filter(|k| k.starts_with('$')).count();
        if operators == 0 {
            return Ok(Self::merge(map.clone()));
        }
        let (Some((op, arg)), 1) = (map.iter().next(), map.len()) else {
            return Err(invalid("expected exactly one operator per update".into()));
        };
        let Value::Object(arg) = arg else {
            return Err(invalid(format!("{op} argument must be an object")));
        };

        match op.as_str() {
            "$set" => Ok(Self::set(arg.iter().map(|(k, v)| (k, v.clone())))),
            "$push" => {
                let (field, element) = single_entry(op, arg)?;
                Ok(Self::push(field, element.clone()))
            }
            "$pull" => {
                let (field, selector) = single_entry(op, arg)?;
                let id = selector
                    .get(ID_FIELD)
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid("$pull selector must be {\"_id\": <string>}".into()))?;
                Ok(Self::pull(field, id))
            }
            other => Err(invalid(format!("unsupported operator {other}"))),
        }
    }

    /// Apply to `doc`, resolving positional paths against `filter`.
    pub fn apply(&self, doc: &mut Document, filter: &Filter) -> Result<()> {
        match self {
            Self::Set(assignments) => {
                let positions = resolve_positions(doc, assignments, filter);
                for assignment in assignments {
                    apply_assignment(doc, assignment, &positions);
                }
            }
            Self::Push { field, element } => {
                let slot = doc
                    .entry(field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if slot.is_null() {
                    *slot = Value::Array(Vec::new());
                }
                let Value::Array(items) = slot else {
                    return Err(invalid(format!("cannot push to non-array field '{field}'")));
                };
                items.push(with_element_id(element.clone()));
            }
            Self::Pull { field, id } => {
                if let Some(Value::Array(items)) = doc.get_mut(field) {
                    let before = items.len();
                    items.retain(|item| {
                        item.get(ID_FIELD).and_then(Value::as_str) != Some(id.as_str())
                    });
                    debug!(field, id, removed = before - items.len(), "pulled elements");
                }
            }
        }
        Ok(())
    }
}

/// Index of the element each positional array targets, resolved once
/// against the unmodified document.
fn resolve_positions(
    doc: &Document,
    assignments: &[Assignment],
    filter: &Filter,
) -> HashMap<String, Option<usize>> {
    let mut positions = HashMap::new();
    for assignment in assignments {
        let FieldPath::Positional { array, .. } = &assignment.path else {
            continue;
        };
        if positions.contains_key(array) {
            continue;
        }
        let index = filter.element_condition(array).and_then(|(key, expected)| {
            doc.get(array)
                .and_then(Value::as_array)?
                .iter()
                .position(|item| item_field_matches(item, key, expected))
        });
        if index.is_none() {
            debug!(array, "no array element matched positional path");
        }
        positions.insert(array.clone(), index);
    }
    positions
}

fn apply_assignment(
    doc: &mut Document,
    assignment: &Assignment,
    positions: &HashMap<String, Option<usize>>,
) {
    match &assignment.path {
        FieldPath::Field(field) => {
            if field == ID_FIELD {
                return;
            }
            doc.insert(field.clone(), assignment.value.clone());
        }
        FieldPath::Positional { array, field } => {
            if field == ID_FIELD {
                return;
            }
            let Some(index) = positions.get(array).copied().flatten() else {
                return;
            };
            let target = doc
                .get_mut(array)
                .and_then(Value::as_array_mut)
                .and_then(|items| items.get_mut(index))
                .and_then(Value::as_object_mut);
            if let Some(element) = target {
                element.insert(field.clone(), assignment.value.clone());
            }
        }
    }
}

/// Object elements pushed into an array get their own `_id` when missing.
fn with_element_id(element: Value) -> Value {
    match element {
        Value::Object(obj) if !obj.contains_key(ID_FIELD) => {
            let mut with_id = Map::with_capacity(obj.len() + 1);
            with_id.insert(ID_FIELD.to_string(), Value::String(ids::document_id()));
            with_id.extend(obj);
            Value::Object(with_id)
        }
        other => other,
    }
}

fn single_entry<'a>(op: &str, arg: &'a Map<String, Value>) -> Result<(&'a str, &'a Value)> {
    let mut entries = arg.iter();
    match (entries.next(), entries.next()) {
        (Some((field, value)), None) => Ok((field.as_str(), value)),
        _ => Err(invalid(format!("{op} takes exactly one field"))),
    }
}

fn invalid(message: String) -> PlanError {
    PlanError::InvalidUpdate(message)
}
