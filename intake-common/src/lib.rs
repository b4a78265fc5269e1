//! # Candidate Intake Common Library
//!
//! Shared code for the candidate intake service:
//! - Candidate record model (stored and incoming shapes)
//! - Contact field validators and the read-time completeness check
//! - Batch merge engine
//! - Pagination
//! - Record store (whole-document JSON file)
//! - Session id generation
//! - Configuration loading

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod pagination;
pub mod schema;
pub mod session;
pub mod store;
pub mod validators;

pub use error::{Error, Result};
pub use merge::{merge, MergeResult, Rejection};
pub use model::{AdditionalQuestion, CandidateRecord, Fields, IncomingRecord};
pub use store::{CandidateStore, JsonFileStore, MemoryStore, Snapshot};
