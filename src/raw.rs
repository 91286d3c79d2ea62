use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::error::ContractError;

/// Recipe fields a site extractor may fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Name,
    City,
    Province,
    Group,
    Ingredients,
    Instructions,
    Notes,
    Description,
    Source,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::Name,
        FieldKey::City,
        FieldKey::Province,
        FieldKey::Group,
        FieldKey::Ingredients,
        FieldKey::Instructions,
        FieldKey::Notes,
        FieldKey::Description,
        FieldKey::Source,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::City => "city",
            FieldKey::Province => "province",
            FieldKey::Group => "group",
            FieldKey::Ingredients => "ingredients",
            FieldKey::Instructions => "instructions",
            FieldKey::Notes => "notes",
            FieldKey::Description => "description",
            FieldKey::Source => "source",
        }
    }

    /// Canonical key name, or `None` for keys the core does not use.
    pub fn from_key(key: &str) -> Option<Self> {
        FieldKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Older crawler output named some fields differently (`title`, `url`).
    fn from_alias(key: &str) -> Option<Self> {
        match key {
            "title" => Some(FieldKey::Name),
            "url" => Some(FieldKey::Source),
            _ => None,
        }
    }
}

/// One raw fragment: a single piece of text or an ordered list of pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

/// Per-field raw fragments extracted from a single source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBlock {
    fields: BTreeMap<FieldKey, RawValue>,
}

impl RawBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: FieldKey, value: RawValue) {
        self.fields.insert(key, value);
    }

    pub fn set_text(&mut self, key: FieldKey, text: impl Into<String>) {
        self.set(key, RawValue::Text(text.into()));
    }

    pub fn set_list<I, S>(&mut self, key: FieldKey, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(key, RawValue::List(items.into_iter().map(Into::into).collect()));
    }

    pub fn with_text(mut self, key: FieldKey, text: impl Into<String>) -> Self {
        self.set_text(key, text);
        self
    }

    pub fn with_list<I, S>(mut self, key: FieldKey, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_list(key, items);
        self
    }

    pub fn get(&self, key: FieldKey) -> Option<&RawValue> {
        self.fields.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert an untyped JSON record into a `RawBlock`.
    ///
    /// Every value must be a string, an array of strings, or null (absent).
    /// Keys the core does not recognize are skipped, but their values are
    /// still held to the same shape.
    pub fn from_json(value: &Value) -> Result<Self, ContractError> {
        let obj = value.as_object().ok_or(ContractError::NotAnObject {
            found: json_type_name(value),
        })?;

        let mut block = RawBlock::new();
        for (key, val) in obj {
            let raw = match val {
                Value::Null => None,
                Value::String(s) => Some(RawValue::Text(s.clone())),
                Value::Array(items) => {
                    let mut list = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(s) => list.push(s.clone()),
                            other => {
                                return Err(ContractError::InvalidShape {
                                    key: key.clone(),
                                    found: json_type_name(other),
                                })
                            }
                        }
                    }
                    Some(RawValue::List(list))
                }
                other => {
                    return Err(ContractError::InvalidShape {
                        key: key.clone(),
                        found: json_type_name(other),
                    })
                }
            };

            let Some(raw) = raw else { continue };
            if let Some(field) = FieldKey::from_key(key) {
                block.set(field, raw);
            } else if let Some(field) = FieldKey::from_alias(key) {
                block.fields.entry(field).or_insert(raw);
            } else {
                debug!(key = %key, "ignoring unrecognized raw field");
            }
        }
        Ok(block)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Crawl-time facts the page itself may not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub default_province: String,
    pub source_url: String,
}

impl BuildContext {
    pub fn new(default_province: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            default_province: default_province.into(),
            source_url: source_url.into(),
        }
    }
}
