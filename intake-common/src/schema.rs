//! Read-time completeness check for candidate records
//!
//! Presence-only structural validation: it reports which fields a client
//! still has to supply. It never checks email or phone formats and never
//! gates writes; see [`crate::merge`] for the write-time check.

use serde::Serialize;
use serde_json::Value;

/// One step in a path into a candidate document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A missing or malformed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: Vec<PathSegment>,
    pub message: String,
}

/// Outcome of the completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReport {
    Valid,
    Invalid(Vec<Violation>),
}

impl SchemaReport {
    pub fn is_valid(&self) -> bool {
        matches!(self, SchemaReport::Valid)
    }

    /// Violations, empty when valid
    pub fn violations(&self) -> &[Violation] {
        match self {
            SchemaReport::Valid => &[],
            SchemaReport::Invalid(v) => v,
        }
    }
}

/// Required non-empty text fields and the label used in their messages
const REQUIRED_TEXT_FIELDS: [(&str, &str); 4] = [
    ("name", "Name"),
    ("email", "Email"),
    ("phone", "Phone"),
    ("available", "Availability"),
];

/// Check a candidate-shaped value of unknown validity
pub fn validate_candidate(value: &Value) -> SchemaReport {
    let mut checker = Checker::default();
    checker.candidate(value);

    if checker.violations.is_empty() {
        SchemaReport::Valid
    } else {
        SchemaReport::Invalid(checker.violations)
    }
}

#[derive(Default)]
struct Checker {
    path: Vec<PathSegment>,
    violations: Vec<Violation>,
}

impl Checker {
    fn candidate(&mut self, value: &Value) {
        let Some(obj) = self.expect_object(value) else {
            return;
        };

        self.at("sessionId", |c| c.string(obj.get("sessionId")));
        self.at("fields", |c| c.fields(obj.get("fields")));
        self.at("additionalQuestions", |c| {
            c.questions(obj.get("additionalQuestions"))
        });
    }

    fn fields(&mut self, value: Option<&Value>) {
        let Some(value) = self.require(value) else {
            return;
        };
        let Some(obj) = self.expect_object(value) else {
            return;
        };

        for (key, label) in REQUIRED_TEXT_FIELDS {
            self.at(key, |c| c.non_empty_string(obj.get(key), label));
        }
        self.at("skills", |c| c.string_array(obj.get("skills")));
    }

    fn questions(&mut self, value: Option<&Value>) {
        let Some(value) = self.require(value) else {
            return;
        };
        let Some(items) = self.expect_array(value) else {
            return;
        };

        for (index, item) in items.iter().enumerate() {
            self.at(index, |c| {
                let Some(obj) = c.expect_object(item) else {
                    return;
                };
                c.at("id", |c| c.string(obj.get("id")));
                c.at("questionText", |c| c.string(obj.get("questionText")));
                if let Some(content) = obj.get("content") {
                    c.at("content", |c| c.string(Some(content)));
                }
            });
        }
    }

    fn string(&mut self, value: Option<&Value>) {
        if let Some(value) = self.require(value) {
            if !value.is_string() {
                self.mismatch("string", value);
            }
        }
    }

    fn non_empty_string(&mut self, value: Option<&Value>, label: &str) {
        let Some(value) = self.require(value) else {
            return;
        };
        match value.as_str() {
            Some("") => self.report(format!("{} is required", label)),
            Some(_) => {}
            None => self.mismatch("string", value),
        }
    }

    fn string_array(&mut self, value: Option<&Value>) {
        let Some(value) = self.require(value) else {
            return;
        };
        let Some(items) = self.expect_array(value) else {
            return;
        };
        for (index, item) in items.iter().enumerate() {
            self.at(index, |c| c.string(Some(item)));
        }
    }

    fn require<'v>(&mut self, value: Option<&'v Value>) -> Option<&'v Value> {
        if value.is_none() {
            self.report("Required".to_string());
        }
        value
    }

    fn expect_object<'v>(&mut self, value: &'v Value) -> Option<&'v serde_json::Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.mismatch("object", value);
        }
        obj
    }

    fn expect_array<'v>(&mut self, value: &'v Value) -> Option<&'v Vec<Value>> {
        let items = value.as_array();
        if items.is_none() {
            self.mismatch("array", value);
        }
        items
    }

    fn at(&mut self, segment: impl Into<PathSegment>, f: impl FnOnce(&mut Self)) {
        self.path.push(segment.into());
        f(self);
        self.path.pop();
    }

    fn mismatch(&mut self, expected: &str, actual: &Value) {
        self.report(format!("Expected {}, received {}", expected, json_type_name(actual)));
    }

    fn report(&mut self, message: String) {
        self.violations.push(Violation {
            path: self.path.clone(),
            message,
        });
    }
}

/// JSON type of a value, as named in violation messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
