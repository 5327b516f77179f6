//! Clause-tree types for the filter-query language.
//!
//! The serialized form of these types (internally tagged with `"type"`,
//! camelCase field names) is a stable contract: downstream consumers such as
//! query executors match on these shapes directly.

use serde::Serialize;

/// Wire name of the computed-distance field attached to geodistance results.
pub const DISTANCE_FIELD: &str = "myDist";

/// A literal value on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// A (latitude, longitude) pair. Not validated geometrically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

/// Bounding box for geobox clauses. The corner labels are positional only;
/// nothing checks that `ne` is actually north-east of `sw`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub ne: Point,
    pub sw: Point,
}

/// Field type named in a `HAS` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
}

/// One node of the parsed filter tree.
///
/// Invariants upheld by the parser: `And`/`Or` hold at least two clauses
/// (only consecutive identical connectives are flattened), `Range` has at
/// least one bound with limit and inclusiveness always set together, and `In`
/// holds at least one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Clause {
    /// Equality: `name = "John"`
    Eq { field: String, value: Value },

    /// String has-prefix: `name PREFIX "Jo"` or `name ^= "Jo"`
    Prefix { field: String, prefix: String },

    /// Numeric range: `age < 30`, `18 <= age < 30`
    Range {
        field: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        lower_limit: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lower_included: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        upper_limit: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        upper_included: Option<bool>,
    },

    /// Membership: `X IN (1 "two" true)`
    In { field: String, values: Vec<Value> },

    /// Field existence with type: `HAS age INTEGER`
    HasField { field: String, field_type: FieldType },

    /// Negation: `!expr`, `NOT expr`, and the desugaring of `field != value`
    Not { inner: Box<Clause> },

    /// Conjunction of two or more clauses.
    And { clauses: Vec<Clause> },

    /// Disjunction of two or more clauses.
    Or { clauses: Vec<Clause> },

    /// Bounding-box containment: `loc IN (100 200) - (300 400)`
    #[serde(rename = "geobox")]
    GeoBox {
        field: String,
        #[serde(rename = "box")]
        bounds: GeoBounds,
    },

    /// Distance from a center point: `loc IN 123 FROM (456 789)`
    #[serde(rename = "geodistance")]
    GeoDistance {
        field: String,
        center: Point,
        radius: f64,
        #[serde(rename = "putDistanceInto")]
        distance_field: String,
    },
}

impl Clause {
    /// Negation, shared by `!`/`NOT` and the `!=` desugaring.
    pub(crate) fn negated(self) -> Self {
        Clause::Not {
            inner: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eq_serializes_tagged() {
        let clause = Clause::Eq {
            field: "name".into(),
            value: Value::String("John".into()),
        };
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"type": "eq", "field": "name", "value": "John"})
        );
    }

    #[test]
    fn range_omits_unset_bounds() {
        let clause = Clause::Range {
            field: "X".into(),
            lower_limit: None,
            lower_included: None,
            upper_limit: Some(12.0),
            upper_included: Some(false),
        };
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"type": "range", "field": "X", "upperLimit": 12.0, "upperIncluded": false})
        );
    }

    #[test]
    fn value_serializes_untagged() {
        assert_eq!(serde_json::to_value(Value::Null).unwrap(), json!(null));
        assert_eq!(
            serde_json::to_value(Value::Boolean(true)).unwrap(),
            json!(true)
        );
        assert_eq!(
            serde_json::to_value(Value::Number(1.5)).unwrap(),
            json!(1.5)
        );
    }

    #[test]
    fn geodistance_wire_names() {
        let clause = Clause::GeoDistance {
            field: "loc".into(),
            center: Point { lat: 1.0, lon: 2.0 },
            radius: 3.0,
            distance_field: DISTANCE_FIELD.into(),
        };
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({
                "type": "geodistance",
                "field": "loc",
                "center": {"lat": 1.0, "lon": 2.0},
                "radius": 3.0,
                "putDistanceInto": "myDist",
            })
        );
    }

    #[test]
    fn field_type_is_uppercase() {
        let clause = Clause::HasField {
            field: "X".into(),
            field_type: FieldType::Decimal,
        };
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"type": "hasField", "field": "X", "fieldType": "DECIMAL"})
        );
    }
}
