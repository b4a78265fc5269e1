//! Candidate record model
//!
//! Two shapes exist for the same JSON document:
//! - [`CandidateRecord`]: what the store holds. Every contact field is present
//!   so partially completed intake records survive a load/save cycle. Loading
//!   is lenient: a missing, null or wrongly-typed member loads as its empty
//!   value instead of failing the whole document.
//! - [`IncomingRecord`]: one entry of a submitted batch. Only `sessionId` is
//!   required; every other member may be absent.
//!
//! JSON keys are camelCase on the wire and on disk.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Contact fields of a stored candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fields {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(deserialize_with = "lenient")]
    pub phone: String,
    #[serde(deserialize_with = "lenient")]
    pub available: String,
    #[serde(deserialize_with = "lenient_skills")]
    pub skills: Vec<String>,
}

/// Supplemental question and the candidate's free-text answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalQuestion {
    pub id: String,
    pub question_text: String,
    /// Absent means unanswered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A stored candidate record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Merge key, immutable once issued
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub fields: Fields,

    #[serde(default, deserialize_with = "lenient_questions")]
    pub additional_questions: Vec<AdditionalQuestion>,

    /// Attributes this service does not interpret, kept as stored
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CandidateRecord {
    /// Create a record with empty contact fields and no questions
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            fields: Fields::default(),
            additional_questions: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl AdditionalQuestion {
    /// Coerce one stored question; non-object entries are dropped
    fn from_stored(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            id: text("id").unwrap_or_default(),
            question_text: text("questionText").unwrap_or_default(),
            content: text("content"),
        })
    }
}

/// Null or wrongly-typed stored values load as the type's default
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the string entries of a stored skills list
fn lenient_skills<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

fn lenient_questions<'de, D>(deserializer: D) -> Result<Vec<AdditionalQuestion>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(AdditionalQuestion::from_stored).collect())
        .unwrap_or_default())
}

/// Contact fields of an incoming batch entry; any of them may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub available: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// One entry of a submitted batch, parsed tolerantly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRecord {
    pub session_id: String,

    #[serde(default)]
    pub fields: Option<IncomingFields>,

    #[serde(default)]
    pub additional_questions: Option<Vec<AdditionalQuestion>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IncomingRecord {
    /// Parse one raw batch entry
    pub fn parse(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Email as submitted, empty when absent
    pub fn email(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|f| f.email.as_deref())
            .unwrap_or_default()
    }

    /// Phone as submitted, empty when absent
    pub fn phone(&self) -> &str {
        self.fields
            .as_ref()
            .and_then(|f| f.phone.as_deref())
            .unwrap_or_default()
    }

    /// Convert into a stored record, filling absent parts with empties
    pub fn into_record(self) -> CandidateRecord {
        let f = self.fields.unwrap_or_default();
        CandidateRecord {
            session_id: self.session_id,
            fields: Fields {
                name: f.name.unwrap_or_default(),
                email: f.email.unwrap_or_default(),
                phone: f.phone.unwrap_or_default(),
                available: f.available.unwrap_or_default(),
                skills: f.skills.unwrap_or_default(),
            },
            additional_questions: self.additional_questions.unwrap_or_default(),
            extra: self.extra,
        }
    }
}

impl Fields {
    /// Fill-gap merge: take an incoming value only where ours is empty.
    ///
    /// Empty means the empty string for text fields and the empty sequence
    /// for `skills`. Present values are never overwritten.
    pub fn fill_gaps(&mut self, incoming: &IncomingFields) {
        fill_text(&mut self.name, incoming.name.as_ref());
        fill_text(&mut self.email, incoming.email.as_ref());
        fill_text(&mut self.phone, incoming.phone.as_ref());
        fill_text(&mut self.available, incoming.available.as_ref());
        if self.skills.is_empty() {
            if let Some(skills) = &incoming.skills {
                self.skills = skills.clone();
            }
        }
    }
}

fn fill_text(slot: &mut String, incoming: Option<&String>) {
    if slot.is_empty() {
        if let Some(value) = incoming {
            slot.clone_from(value);
        }
    }
}
