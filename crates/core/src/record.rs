//! Medical record entity, update payloads, and the merge rules between them.
//!
//! The partial-update rules are written out as an explicit per-field table in
//! [`MedicalRecord::apply_update`] rather than any generic reflection-style
//! merge, so each field's overwrite condition is auditable and testable on
//! its own.
//!
//! ## Ownership identifiers
//!
//! `patient_id` and `doctor_id` are set only at creation. Update payloads may
//! carry them (clients often echo the whole record back), but no update path
//! ever applies them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier assigned by the record store on first save.
pub type RecordId = i64;

/// Therapy schedule progress. The wire form is the uppercase variant name,
/// matching the historical API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TherapyStatus {
    Pending,
    Active,
    Completed,
}

impl TherapyStatus {
    /// Name string used in the flattened presentation shape.
    pub fn name(&self) -> &'static str {
        match self {
            TherapyStatus::Pending => "PENDING",
            TherapyStatus::Active => "ACTIVE",
            TherapyStatus::Completed => "COMPLETED",
        }
    }
}

/// A patient's medical record, the sole entity this service stores.
///
/// `id` is `None` until the store assigns one. `visit_date`, `symptoms` and
/// `therapy_name` are set at creation and have no update path.
/// `required_therapy_ids` uses replace-on-present semantics: `None` in a
/// payload means untouched, `Some` (empty included) fully replaces the
/// stored list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecord {
    pub id: Option<RecordId>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub visit_date: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescribed_treatment: Option<String>,
    pub doctor_notes: Option<String>,
    pub medical_history_notes: Option<String>,
    pub medications: Option<String>,
    pub follow_up_required: Option<String>,
    pub need_therapy: bool,
    pub required_therapy_ids: Option<Vec<i64>>,
    pub therapy_plan_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub therapy_name: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<TherapyStatus>,
    pub no_of_days: Option<i32>,
    pub rating: Option<f64>,
}

/// Partial-update payload for a medical record.
///
/// Every field is optional on the wire except `need_therapy`, which is a
/// plain boolean: an absent value deserializes as `false` and is applied
/// unconditionally, because `false` is a meaningful explicit value rather
/// than "absent".
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordUpdate {
    // Accepted so clients can echo a full record back, never applied.
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub medical_history_notes: Option<String>,
    pub medications: Option<String>,
    pub follow_up_required: Option<String>,
    pub diagnosis: Option<String>,
    pub prescribed_treatment: Option<String>,
    pub doctor_notes: Option<String>,
    pub need_therapy: bool,
    pub required_therapy_ids: Option<Vec<i64>>,
    pub therapy_plan_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub status: Option<TherapyStatus>,
    pub no_of_days: Option<i32>,
    pub rating: Option<f64>,
}

/// Request body for the therapy-update operation.
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TherapyUpdate {
    pub need_therapy: bool,
    #[serde(default)]
    pub therapy_ids: Option<Vec<i64>>,
}

/// Flattened read model returned by the listing endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecordSummary {
    pub id: Option<RecordId>,
    pub visit_date: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescribed_treatment: Option<String>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub therapist_id: Option<i64>,
    pub created_date: Option<NaiveDate>,
    pub therapy_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub no_of_days: Option<i32>,
    pub doctor_notes: Option<String>,
    pub rating: Option<f64>,
}

/// Overwrite a text field only when the payload value is present and
/// non-empty; an empty string never clears stored text.
fn merge_text(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            *slot = Some(v);
        }
    }
}

impl MedicalRecord {
    /// Apply a partial update in place.
    ///
    /// Field-by-field overwrite conditions:
    ///
    /// - text fields: payload value non-null and non-empty
    /// - `need_therapy`: always overwritten
    /// - `required_therapy_ids`: payload value non-null; an explicit empty
    ///   list clears the stored one
    /// - `therapy_plan_id`, `therapist_id`, `status`, `no_of_days`,
    ///   `rating`: payload value non-null
    /// - `patient_id`, `doctor_id`: never overwritten
    pub fn apply_update(&mut self, update: RecordUpdate) {
        merge_text(&mut self.medical_history_notes, update.medical_history_notes);
        merge_text(&mut self.medications, update.medications);
        merge_text(&mut self.follow_up_required, update.follow_up_required);
        merge_text(&mut self.diagnosis, update.diagnosis);
        merge_text(&mut self.prescribed_treatment, update.prescribed_treatment);
        merge_text(&mut self.doctor_notes, update.doctor_notes);

        self.need_therapy = update.need_therapy;

        if let Some(therapy_ids) = update.required_therapy_ids {
            self.required_therapy_ids = Some(therapy_ids);
        }

        if let Some(therapy_plan_id) = update.therapy_plan_id {
            self.therapy_plan_id = Some(therapy_plan_id);
        }
        if let Some(therapist_id) = update.therapist_id {
            self.therapist_id = Some(therapist_id);
        }
        if let Some(status) = update.status {
            self.status = Some(status);
        }
        if let Some(no_of_days) = update.no_of_days {
            self.no_of_days = Some(no_of_days);
        }
        if let Some(rating) = update.rating {
            self.rating = Some(rating);
        }
    }

    /// Flatten into the presentation shape used by the listing endpoint.
    pub fn summary(&self) -> MedicalRecordSummary {
        MedicalRecordSummary {
            id: self.id,
            visit_date: self.visit_date,
            symptoms: self.symptoms.clone(),
            diagnosis: self.diagnosis.clone(),
            prescribed_treatment: self.prescribed_treatment.clone(),
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            therapist_id: self.therapist_id,
            created_date: self.created_date,
            therapy_name: self.therapy_name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.map(|s| s.name().to_string()),
            no_of_days: self.no_of_days,
            doctor_notes: self.doctor_notes.clone(),
            rating: self.rating,
        }
    }
}
