//! # Medrec Core
//!
//! Core business logic for the medical record service.
//!
//! This crate contains pure data operations:
//! - The `MedicalRecord` entity and its partial-update merge rules
//! - Therapy-list and therapist assignment operations
//! - JSON file-per-record storage under a configured data directory
//!
//! **No API concerns**: HTTP routing, status-code mapping, and OpenAPI
//! documentation belong in `api-rest`.

pub mod config;
pub mod error;
pub mod record;
pub mod service;
pub mod store;

pub use config::{assignment_mode_from_env_value, AssignmentMode, CoreConfig};
pub use error::{RecordError, RecordResult};
pub use record::{
    MedicalRecord, MedicalRecordSummary, RecordId, RecordUpdate, TherapyStatus, TherapyUpdate,
};
pub use service::RecordService;
pub use store::{JsonRecordStore, RecordStore};
