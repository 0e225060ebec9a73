//! Action plan domain model.
//!
//! An [`ActionPlan`] is the ordered list of candidate operations proposed for one
//! user command. Each [`Action`] names a tool and carries a [`ParameterBag`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString, IntoStaticStr};

/// Reserved key under which the nested parameter bag travels on the wire.
pub const NESTED_BAG_KEY: &str = "parameters";

/// Tools the console knows how to present results for.
///
/// Any other identifier is still accepted in an [`Action`]; it simply falls
/// through to the generic acknowledgement when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ToolKind {
    SendEmail,
    ScheduleMeeting,
    NotifyTeam,
    ScheduleOperation,
    CancelOperation,
}

/// A single parameter value: a scalar or a list of scalars.
///
/// Nesting is expressed one level up, by [`ParameterBag`], so a `ParamValue`
/// can never contain another bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Text shown in the editor; lists use the comma-separated convention.
    pub fn display_text(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::List(items) => items.join(", "),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Scalar(value) => Value::String(value.clone()),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

/// A flat mapping of field name to value.
pub type FlatBag = BTreeMap<String, ParamValue>;

/// Parameters of one action: a flat bag plus at most one nested flat bag.
///
/// On the wire this is a single JSON object; the nested bag, when present, is
/// the object under the reserved `parameters` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Value>",
    into = "BTreeMap<String, Value>"
)]
pub struct ParameterBag {
    fields: FlatBag,
    nested: Option<FlatBag>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a top-level field.
    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Builder-style attach of the nested bag.
    pub fn with_nested(mut self, nested: FlatBag) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn fields(&self) -> &FlatBag {
        &self.fields
    }

    pub fn nested(&self) -> Option<&FlatBag> {
        self.nested.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.fields.get(key)
    }

    /// Scalar lookup of a top-level field.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_scalar)
    }

    pub fn get_nested(&self, key: &str) -> Option<&ParamValue> {
        self.nested.as_ref().and_then(|bag| bag.get(key))
    }

    /// Selects the top-level bag or the nested one.
    pub fn bag(&self, nested: bool) -> Option<&FlatBag> {
        if nested {
            self.nested.as_ref()
        } else {
            Some(&self.fields)
        }
    }

    pub(crate) fn bag_mut(&mut self, nested: bool) -> Option<&mut FlatBag> {
        if nested {
            self.nested.as_mut()
        } else {
            Some(&mut self.fields)
        }
    }
}

fn scalar_from_json(key: &str, value: Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(format!(
            "field '{key}' holds an unsupported value: {other}"
        )),
    }
}

fn flat_value_from_json(key: &str, value: Value) -> Result<ParamValue, String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| scalar_from_json(key, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List),
        Value::Object(_) => Err(format!(
            "field '{key}' nests a parameter group; only '{NESTED_BAG_KEY}' may do that"
        )),
        scalar => scalar_from_json(key, scalar).map(ParamValue::Scalar),
    }
}

fn flat_bag_from_json(map: Map<String, Value>) -> Result<FlatBag, String> {
    map.into_iter()
        .map(|(key, value)| {
            let value = flat_value_from_json(&key, value)?;
            Ok((key, value))
        })
        .collect()
}

impl TryFrom<BTreeMap<String, Value>> for ParameterBag {
    type Error = String;

    fn try_from(map: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let mut bag = ParameterBag::new();
        for (key, value) in map {
            match value {
                Value::Object(inner) if key == NESTED_BAG_KEY => {
                    bag.nested = Some(flat_bag_from_json(inner)?);
                }
                other => {
                    let value = flat_value_from_json(&key, other)?;
                    bag.fields.insert(key, value);
                }
            }
        }
        Ok(bag)
    }
}

impl From<ParameterBag> for BTreeMap<String, Value> {
    fn from(bag: ParameterBag) -> Self {
        let mut map: BTreeMap<String, Value> = bag
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        if let Some(nested) = bag.nested {
            let inner: Map<String, Value> = nested
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect();
            map.insert(NESTED_BAG_KEY.to_string(), Value::Object(inner));
        }
        map
    }
}

/// One candidate operation proposed by the NLU service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Operation identifier, e.g. `send_email`.
    pub tool: String,
    #[serde(default)]
    pub parameters: ParameterBag,
}

impl Action {
    pub fn new(tool: impl Into<String>, parameters: ParameterBag) -> Self {
        Self {
            tool: tool.into(),
            parameters,
        }
    }

    /// The known tool this action targets, if any.
    pub fn tool_kind(&self) -> Option<ToolKind> {
        self.tool.parse().ok()
    }
}

/// Ordered sequence of actions awaiting review.
///
/// Actions are identified by position. Edits never happen in place: the
/// parameter editor returns a new plan value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPlan {
    actions: Vec<Action>,
}

impl ActionPlan {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub(crate) fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}

impl<'a> IntoIterator for &'a ActionPlan {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
