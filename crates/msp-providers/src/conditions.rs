//! Query conditions and their rendering into vendor filter syntax.
//!
//! Callers express filters as `{field, operator, value}` triples. The
//! operator name maps through a fixed table; values are quoted per vendor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEquals,
    LessThanOrEquals,
    Contains,
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Parse an operator name. Unknown names fall back to [`Operator::Equals`].
    pub fn parse(name: &str) -> Operator {
        match name {
            "equals" => Operator::Equals,
            "not_equals" => Operator::NotEquals,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            "greater_than_or_equals" => Operator::GreaterThanOrEquals,
            "less_than_or_equals" => Operator::LessThanOrEquals,
            "contains" => Operator::Contains,
            "like" => Operator::Like,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "is_null" => Operator::IsNull,
            "is_not_null" => Operator::IsNotNull,
            _ => Operator::Equals,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterThanOrEquals => "greater_than_or_equals",
            Operator::LessThanOrEquals => "less_than_or_equals",
            Operator::Contains => "contains",
            Operator::Like => "like",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsNull => "is_null",
            Operator::IsNotNull => "is_not_null",
        }
    }

    /// Native operator token.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThanOrEquals => "<=",
            Operator::Contains => "contains",
            Operator::Like => "like",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
        }
    }

    /// Whether the operator takes no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Operator::parse(&name))
    }
}

/// One filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    #[serde(default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Render as a ConnectWise clause, or `None` when the clause is void
    /// (empty field, or a binary operator without a value).
    pub fn to_connectwise(&self) -> Option<String> {
        if self.field.is_empty() {
            return None;
        }
        if self.operator.is_unary() {
            return Some(format!("{} {}", self.field, self.operator.symbol()));
        }
        if self.value.is_null() {
            return None;
        }
        Some(format!(
            "{} {} {}",
            self.field,
            self.operator.symbol(),
            connectwise_value(&self.value)
        ))
    }
}

/// Join the renderable conditions with ` AND `. `None` when nothing renders.
pub fn connectwise_conditions(conditions: &[Condition]) -> Option<String> {
    let clauses: Vec<String> = conditions
        .iter()
        .filter_map(Condition::to_connectwise)
        .collect();
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    }
}

/// ConnectWise value literal: strings single-quoted, lists bracketed.
pub fn connectwise_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{s}'"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(connectwise_value).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Plain query-string rendering of a filter value; `None` for null.
pub fn query_param_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().filter_map(query_param_value).collect();
            Some(items.join(","))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
