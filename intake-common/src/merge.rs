//! Batch merge engine
//!
//! Reconciles a batch of incoming candidate entries against the stored
//! record set. Matching `sessionId`s are merged fill-gap style (stored
//! non-empty values always win); unknown ones are appended. Each resulting
//! record must carry a valid email and phone. The batch is atomic: a single
//! rejection discards every change made by the batch.

use serde::Serialize;
use serde_json::Value;

use crate::model::{CandidateRecord, IncomingRecord};
use crate::validators::{validate_email, validate_phone};

/// How one accepted batch entry was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    Added,
    Merged,
}

/// A batch entry that could not be accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Position of the entry in the submitted batch
    pub index: usize,
    /// Absent only when the entry was unparseable and carried no string id
    pub session_id: Option<String>,
    pub email: String,
    pub phone: String,
    pub email_valid: bool,
    pub phone_valid: bool,
    /// Parse failure, for entries that were not candidate-shaped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of merging one batch
#[derive(Debug, Clone, PartialEq)]
pub enum MergeResult {
    /// Every entry accepted; `updated_set` replaces the stored set
    Applied {
        updated_set: Vec<CandidateRecord>,
        added_count: usize,
        merged_count: usize,
        /// One outcome per batch entry, in batch order
        outcomes: Vec<RecordOutcome>,
    },
    /// At least one entry failed; nothing from the batch may be applied
    Rejected { rejections: Vec<Rejection> },
}

impl MergeResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, MergeResult::Applied { .. })
    }
}

/// Merge raw batch entries into `existing`.
///
/// Entries are parsed with [`IncomingRecord::parse`]; an entry that does not
/// parse is rejected like an entry with invalid contact fields.
pub fn merge(existing: &[CandidateRecord], incoming: &[Value]) -> MergeResult {
    let mut batch = Batch::new(existing);

    for (index, raw) in incoming.iter().enumerate() {
        match IncomingRecord::parse(raw) {
            Ok(record) => batch.apply(index, record),
            Err(e) => batch.reject_unparseable(index, raw, e.to_string()),
        }
    }

    batch.finish()
}

/// Merge already-parsed entries into `existing`
pub fn merge_records(existing: &[CandidateRecord], incoming: Vec<IncomingRecord>) -> MergeResult {
    let mut batch = Batch::new(existing);

    for (index, record) in incoming.into_iter().enumerate() {
        batch.apply(index, record);
    }

    batch.finish()
}

/// Working copy of the record set plus accumulated bookkeeping
struct Batch {
    working: Vec<CandidateRecord>,
    added_count: usize,
    merged_count: usize,
    outcomes: Vec<RecordOutcome>,
    rejections: Vec<Rejection>,
}

impl Batch {
    fn new(existing: &[CandidateRecord]) -> Self {
        Self {
            working: existing.to_vec(),
            added_count: 0,
            merged_count: 0,
            outcomes: Vec::new(),
            rejections: Vec::new(),
        }
    }

    fn apply(&mut self, index: usize, incoming: IncomingRecord) {
        let position = self
            .working
            .iter()
            .position(|r| r.session_id == incoming.session_id);

        match position {
            Some(position) => self.merge_into(index, position, incoming),
            None => self.add(index, incoming),
        }
    }

    fn merge_into(&mut self, index: usize, position: usize, incoming: IncomingRecord) {
        let mut merged = self.working[position].fields.clone();
        if let Some(fields) = &incoming.fields {
            merged.fill_gaps(fields);
        }

        if self.check(index, &incoming.session_id, &merged.email, &merged.phone) {
            self.working[position].fields = merged;
            self.merged_count += 1;
            self.outcomes.push(RecordOutcome::Merged);
        }
    }

    fn add(&mut self, index: usize, incoming: IncomingRecord) {
        if self.check(index, &incoming.session_id, incoming.email(), incoming.phone()) {
            self.working.push(incoming.into_record());
            self.added_count += 1;
            self.outcomes.push(RecordOutcome::Added);
        }
    }

    /// Validate contact fields, recording a rejection on failure
    fn check(&mut self, index: usize, session_id: &str, email: &str, phone: &str) -> bool {
        let email_valid = validate_email(email);
        let phone_valid = validate_phone(phone);

        if email_valid && phone_valid {
            return true;
        }

        self.rejections.push(Rejection {
            index,
            session_id: Some(session_id.to_string()),
            email: email.to_string(),
            phone: phone.to_string(),
            email_valid,
            phone_valid,
            error: None,
        });
        false
    }

    fn reject_unparseable(&mut self, index: usize, raw: &Value, error: String) {
        let session_id = raw
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string);

        self.rejections.push(Rejection {
            index,
            session_id,
            email: String::new(),
            phone: String::new(),
            email_valid: false,
            phone_valid: false,
            error: Some(error),
        });
    }

    fn finish(self) -> MergeResult {
        if !self.rejections.is_empty() {
            return MergeResult::Rejected {
                rejections: self.rejections,
            };
        }

        MergeResult::Applied {
            updated_set: self.working,
            added_count: self.added_count,
            merged_count: self.merged_count,
            outcomes: self.outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fields;
    use serde_json::json;

    fn stored(id: &str, email: &str, phone: &str) -> CandidateRecord {
        let mut record = CandidateRecord::new(id);
        record.fields = Fields {
            name: format!("Candidate {}", id),
            email: email.to_string(),
            phone: phone.to_string(),
            available: "Immediately".to_string(),
            skills: vec!["rust".to_string()],
        };
        record
    }

    fn applied(result: MergeResult) -> (Vec<CandidateRecord>, usize, usize, Vec<RecordOutcome>) {
        match result {
            MergeResult::Applied {
                updated_set,
                added_count,
                merged_count,
                outcomes,
            } => (updated_set, added_count, merged_count, outcomes),
            MergeResult::Rejected { rejections } => {
                panic!("expected batch to apply, got {:?}", rejections)
            }
        }
    }

    fn rejected(result: MergeResult) -> Vec<Rejection> {
        match result {
            MergeResult::Rejected { rejections } => rejections,
            other => panic!("expected batch to be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_add_appends_unchanged() {
        let existing = vec![stored("a", "a@example.com", "9876543210")];
        let entry = json!({
            "sessionId": "b",
            "fields": {
                "name": "Bina",
                "email": "bina@example.com",
                "phone": "8123456789",
                "available": "Next month",
                "skills": ["go"]
            },
            "additionalQuestions": [{ "id": "q1", "questionText": "Why?" }]
        });

        let (set, added, merged, outcomes) = applied(merge(&existing, &[entry.clone()]));
        assert_eq!(added, 1);
        assert_eq!(merged, 0);
        assert_eq!(outcomes, vec![RecordOutcome::Added]);
        assert_eq!(set.len(), 2);
        assert_eq!(set[0], existing[0]);
        assert_eq!(serde_json::to_value(&set[1]).unwrap(), entry);
    }

    #[test]
    fn test_existing_wins() {
        let existing = vec![stored("a", "a@example.com", "9876543210")];
        let entry = json!({
            "sessionId": "a",
            "fields": { "phone": "9000000000", "name": "Other" }
        });

        let (set, added, merged, _) = applied(merge(&existing, &[entry]));
        assert_eq!((added, merged), (0, 1));
        assert_eq!(set[0].fields.phone, "9876543210");
        assert_eq!(set[0].fields.name, "Candidate a");
    }

    #[test]
    fn test_fill_gaps_completes_record() {
        let mut partial = stored("a", "", "");
        partial.fields.available = String::new();
        partial.additional_questions = vec![crate::model::AdditionalQuestion {
            id: "q1".to_string(),
            question_text: "Why?".to_string(),
            content: Some("Because".to_string()),
        }];
        let existing = vec![stored("z", "z@example.com", "7000000000"), partial];

        let entry = json!({
            "sessionId": "a",
            "fields": {
                "email": "a@example.com",
                "phone": "6123456789",
                "available": "Now"
            },
            "additionalQuestions": []
        });

        let (set, _, merged, outcomes) = applied(merge(&existing, &[entry]));
        assert_eq!(merged, 1);
        assert_eq!(outcomes, vec![RecordOutcome::Merged]);
        // position preserved
        assert_eq!(set[1].session_id, "a");
        assert_eq!(set[1].fields.email, "a@example.com");
        assert_eq!(set[1].fields.phone, "6123456789");
        assert_eq!(set[1].fields.available, "Now");
        // questions of the stored record are untouched
        assert_eq!(set[1].additional_questions.len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = vec![stored("a", "", "9876543210")];
        let entry = json!({
            "sessionId": "a",
            "fields": { "email": "a@example.com", "phone": "9000000000" }
        });

        let (once, ..) = applied(merge(&existing, &[entry.clone()]));
        let (twice, added, merged, _) = applied(merge(&once, &[entry]));
        assert_eq!(once, twice);
        assert_eq!((added, merged), (0, 1));
    }

    #[test]
    fn test_batch_is_atomic() {
        let existing = vec![stored("a", "a@example.com", "9876543210")];
        let batch = [
            json!({ "sessionId": "b", "fields": { "email": "b@example.com", "phone": "8123456789" } }),
            json!({ "sessionId": "c", "fields": { "email": "not-an-email", "phone": "8123456789" } }),
        ];

        let rejections = rejected(merge(&existing, &batch));
        assert_eq!(
            rejections,
            vec![Rejection {
                index: 1,
                session_id: Some("c".to_string()),
                email: "not-an-email".to_string(),
                phone: "8123456789".to_string(),
                email_valid: false,
                phone_valid: true,
                error: None,
            }]
        );
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn test_merge_rejection_reports_merged_values() {
        let existing = vec![stored("a", "broken", "")];
        let entry = json!({ "sessionId": "a", "fields": { "email": "a@example.com" } });

        let rejections = rejected(merge(&existing, &[entry]));
        assert_eq!(rejections[0].email, "broken");
        assert_eq!(rejections[0].phone, "");
        assert!(!rejections[0].email_valid);
        assert!(!rejections[0].phone_valid);
    }

    #[test]
    fn test_missing_fields_is_rejected_not_panic() {
        let rejections = rejected(merge(&[], &[json!({ "sessionId": "a" })]));
        assert_eq!(rejections.len(), 1);
        assert_eq!(rejections[0].email, "");
        assert!(!rejections[0].email_valid && !rejections[0].phone_valid);
    }

    #[test]
    fn test_unparseable_entries_are_rejected() {
        let batch = [
            json!({ "sessionId": "ok", "fields": { "email": "a@example.com", "phone": "9876543210" } }),
            json!("just a string"),
            json!({ "sessionId": "x", "fields": "oops" }),
        ];

        let rejections = rejected(merge(&[], &batch));
        assert_eq!(rejections.len(), 2);
        assert_eq!(rejections[0].index, 1);
        assert_eq!(rejections[0].session_id, None);
        assert!(rejections[0].error.is_some());
        assert_eq!(rejections[1].session_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_repeated_session_id_in_batch_merges_into_earlier_entry() {
        let batch = [
            json!({ "sessionId": "a", "fields": { "email": "a@example.com", "phone": "9876543210" } }),
            json!({ "sessionId": "a", "fields": { "name": "Asha", "phone": "9000000000" } }),
        ];

        let (set, added, merged, outcomes) = applied(merge(&[], &batch));
        assert_eq!(set.len(), 1);
        assert_eq!((added, merged), (1, 1));
        assert_eq!(outcomes, vec![RecordOutcome::Added, RecordOutcome::Merged]);
        assert_eq!(set[0].fields.name, "Asha");
        assert_eq!(set[0].fields.phone, "9876543210");
    }

    #[test]
    fn test_stored_invalid_data_is_rejected_on_resubmission() {
        let existing = vec![stored("a", "not-an-email", "9876543210")];
        let entry = json!({ "sessionId": "a", "fields": { "email": "not-an-email" } });
        assert!(!merge(&existing, &[entry]).is_applied());
    }

    #[test]
    fn test_empty_batch_applies_nothing() {
        let existing = vec![stored("a", "a@example.com", "9876543210")];
        let (set, added, merged, outcomes) = applied(merge(&existing, &[]));
        assert_eq!(set, existing);
        assert_eq!((added, merged), (0, 0));
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_merge_records_parsed_entries() {
        let entry = IncomingRecord::parse(&json!({
            "sessionId": "a",
            "fields": { "email": "a@example.com", "phone": "9876543210" }
        }))
        .unwrap();

        let (set, added, ..) = applied(merge_records(&[], vec![entry]));
        assert_eq!(added, 1);
        assert_eq!(set[0].fields.name, "");
    }
}
