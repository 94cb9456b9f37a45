use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Literal the catalog uses for "no value" in description and page URL.
pub const NO_VALUE: &str = "-";

/// Title shown when a poster has none.
pub const UNTITLED: &str = "(untitled)";

/// A single poster from the list endpoint.
///
/// Fields the viewer does not know about are kept in `extra` so the snapshot
/// holds the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "imageUrl",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(
        rename = "pageUrl",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PosterRecord {
    /// The id as text, the form used for lookups and links.
    pub fn id_text(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Number(n) => number_text(n),
            other => other.to_string(),
        }
    }

    pub fn display_title(&self) -> &str {
        present(&self.title).unwrap_or(UNTITLED)
    }

    /// Year as shown to the user; empty strings, zero and `false` count as
    /// no year.
    pub fn year_text(&self) -> Option<String> {
        match self.year.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    pub fn description_text(&self) -> Option<&str> {
        present(&self.description).filter(|d| *d != NO_VALUE)
    }

    pub fn source_url(&self) -> Option<&str> {
        present(&self.page_url).filter(|u| *u != NO_VALUE)
    }

    pub fn image_src(&self) -> &str {
        self.image_url.as_deref().unwrap_or("")
    }

    /// Tags with surrounding whitespace removed and blanks dropped.
    pub fn visible_tags(&self) -> Vec<&str> {
        non_blank(&self.tags)
    }
}

/// Per-poster enrichment produced by the external analysis process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedFragment {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub simple_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub research_description: Option<String>,
    #[serde(default, skip_serializing_if = "TagGroups::is_absent")]
    pub tags: TagGroups,
}

impl GeneratedFragment {
    /// Interpret a fragment body. Anything but a JSON object carries no
    /// usable fields and yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn simple_text(&self) -> Option<&str> {
        present(&self.simple_description)
    }

    pub fn research_text(&self) -> Option<&str> {
        present(&self.research_description)
    }
}

/// One analysis category and its values, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct TagGroup {
    pub category: String,
    pub tags: Vec<String>,
}

impl TagGroup {
    pub fn visible_tags(&self) -> Vec<&str> {
        non_blank(&self.tags)
    }
}

/// Category-keyed tags of a fragment. Only a JSON object becomes `Groups`;
/// arrays, scalars and null are `Absent`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TagGroups {
    #[default]
    Absent,
    Groups(Vec<TagGroup>),
}

impl TagGroups {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => TagGroups::Groups(
                map.into_iter()
                    .map(|(category, tags)| TagGroup {
                        category,
                        tags: coerce_tags(&tags),
                    })
                    .collect(),
            ),
            _ => TagGroups::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, TagGroups::Absent)
    }

    pub fn groups(&self) -> &[TagGroup] {
        match self {
            TagGroups::Groups(groups) => groups,
            TagGroups::Absent => &[],
        }
    }

    /// True when at least one category holds a non-blank value.
    pub fn has_entries(&self) -> bool {
        self.groups().iter().any(|g| !g.visible_tags().is_empty())
    }
}

impl<'de> Deserialize<'de> for TagGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(TagGroups::from_value(Value::deserialize(deserializer)?))
    }
}

impl Serialize for TagGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagGroups::Absent => serializer.serialize_none(),
            TagGroups::Groups(groups) => {
                let mut map = serializer.serialize_map(Some(groups.len()))?;
                for group in groups {
                    map.serialize_entry(&group.category, &group.tags)?;
                }
                map.end()
            }
        }
    }
}

/// Records from a list response: either a bare array or an object with an
/// `items` array. Any other shape is an empty list.
pub fn records_from_body(body: Value) -> Vec<PosterRecord> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<PosterRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("skipping malformed poster entry: {}", e);
                None
            }
        })
        .collect()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn non_blank(tags: &[String]) -> Vec<&str> {
    tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect()
}

/// Whole floats print without a fraction, so `1.0` and `1` give the same id.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 { "0".to_string() } else { format!("{:.0}", f) }
        }
        _ => n.to_string(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_text(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(coerce_tags(&Value::deserialize(deserializer)?))
}
