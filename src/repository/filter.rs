//! Storage-independent query predicates
//!
//! A [`Filter`] is a conjunction of [`Condition`]s. The builder methods take
//! optional inputs and skip the ones that are absent, so list endpoints can
//! pass their query parameters straight through.

use chrono::NaiveDate;
use serde_json::Value;

use super::store::{Document, ID_FIELD};
use crate::models::reference::{resolve, ObjectRef};

/// A bound for range conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Number(f64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring match on a text field
    Contains { field: &'static str, needle: String },
    /// Exact match
    Equals { field: &'static str, value: Value },
    /// Array field contains `value`
    HasMember { field: &'static str, value: Value },
    /// `field >= bound`
    AtLeast { field: &'static str, bound: Scalar },
    /// `field <= bound`
    AtMost { field: &'static str, bound: Scalar },
    /// Array field present and non-empty
    NonEmpty { field: &'static str },
    /// Primary reference is one of `ids`
    IdIn { ids: Vec<ObjectRef> },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Substring match; empty needles are ignored
    pub fn contains(self, field: &'static str, needle: Option<&str>) -> Self {
        match needle.filter(|n| !n.is_empty()) {
            Some(n) => self.push(Condition::Contains { field, needle: n.to_string() }),
            None => self,
        }
    }

    pub fn equals<V: Into<Value>>(self, field: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(Condition::Equals { field, value: v.into() }),
            None => self,
        }
    }

    /// Exact match on a reference field. Malformed references drop the
    /// condition instead of forcing an empty result.
    pub fn reference(self, field: &'static str, raw: Option<&str>) -> Self {
        self.equals(field, resolve(raw))
    }

    /// Set membership on a reference array field, lenient like [`Filter::reference`]
    pub fn member(self, field: &'static str, raw: Option<&str>) -> Self {
        match resolve(raw) {
            Some(r) => self.push(Condition::HasMember { field, value: r.into() }),
            None => self,
        }
    }

    pub fn at_least(self, field: &'static str, bound: Option<Scalar>) -> Self {
        match bound {
            Some(bound) => self.push(Condition::AtLeast { field, bound }),
            None => self,
        }
    }

    pub fn at_most(self, field: &'static str, bound: Option<Scalar>) -> Self {
        match bound {
            Some(bound) => self.push(Condition::AtMost { field, bound }),
            None => self,
        }
    }

    pub fn non_empty(self, field: &'static str) -> Self {
        self.push(Condition::NonEmpty { field })
    }

    pub fn id_in(self, ids: Vec<ObjectRef>) -> Self {
        self.push(Condition::IdIn { ids })
    }

    /// Evaluate against a document held in memory
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

impl Condition {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Contains { field, needle } => doc
                .get(*field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Condition::Equals { field, value } => doc.get(*field).map(|v| values_equal(v, value)).unwrap_or(false),
            Condition::HasMember { field, value } => doc
                .get(*field)
                .and_then(Value::as_array)
                .map(|items| items.iter().any(|v| values_equal(v, value)))
                .unwrap_or(false),
            Condition::AtLeast { field, bound } => {
                compare(doc.get(*field), bound).map(|o| o.is_ge()).unwrap_or(false)
            }
            Condition::AtMost { field, bound } => {
                compare(doc.get(*field), bound).map(|o| o.is_le()).unwrap_or(false)
            }
            Condition::NonEmpty { field } => doc
                .get(*field)
                .and_then(Value::as_array)
                .map(|items| !items.is_empty())
                .unwrap_or(false),
            Condition::IdIn { ids } => doc
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<ObjectRef>().ok())
                .map(|id| ids.contains(&id))
                .unwrap_or(false),
        }
    }
}

/// Numbers compare by value so `1990` and `1990.0` match
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(value: Option<&Value>, bound: &Scalar) -> Option<std::cmp::Ordering> {
    match bound {
        Scalar::Number(b) => value?.as_f64()?.partial_cmp(b),
        Scalar::Date(b) => {
            let d = NaiveDate::parse_from_str(value?.as_str()?, "%Y-%m-%d").ok()?;
            Some(d.cmp(b))
        }
    }
}
