//! Medical record operations.
//!
//! Pure data operations over a [`RecordStore`], no API concerns. Every
//! mutation is a single load-merge-save; identifier misses fail with
//! [`RecordError::NotFound`] before anything is written.

use crate::config::{AssignmentMode, CoreConfig};
use crate::error::{RecordError, RecordResult};
use crate::record::{MedicalRecord, MedicalRecordSummary, RecordId, RecordUpdate};
use crate::store::RecordStore;
use std::sync::Arc;

/// Service for creating, querying and mutating medical records.
#[derive(Clone, Debug)]
pub struct RecordService<S> {
    cfg: Arc<CoreConfig>,
    store: Arc<S>,
}

impl<S: RecordStore> RecordService<S> {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<S>) -> Self {
        Self { cfg, store }
    }

    fn load(&self, id: RecordId) -> RecordResult<MedicalRecord> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| RecordError::record_not_found(id))
    }

    /// Create a new record for a patient.
    ///
    /// In [`AssignmentMode::Legacy`] (the default) the supplied patient id
    /// and any doctor id in the payload are discarded and both ownership
    /// identifiers are stored as null — the historical behaviour of a system
    /// that never wired creation to real patient/doctor lookups. In
    /// [`AssignmentMode::Apply`] the identifiers are stored as supplied.
    pub fn create(&self, patient_id: i64, mut record: MedicalRecord) -> RecordResult<MedicalRecord> {
        tracing::info!(patient_id, "creating medical record");

        record.id = None;
        match self.cfg.assignment_mode() {
            AssignmentMode::Legacy => {
                record.patient_id = None;
                record.doctor_id = None;
            }
            AssignmentMode::Apply => {
                record.patient_id = Some(patient_id);
            }
        }

        self.store.save(record)
    }

    /// Fetch a single record.
    ///
    /// # Errors
    /// Returns [`RecordError::NotFound`] when no record exists with `id`.
    pub fn get(&self, id: RecordId) -> RecordResult<MedicalRecord> {
        self.load(id)
    }

    /// All records, flattened to the presentation shape, in storage order.
    pub fn list(&self) -> RecordResult<Vec<MedicalRecordSummary>> {
        let records = self.store.find_all()?;
        Ok(records.iter().map(MedicalRecord::summary).collect())
    }

    pub fn list_by_patient(&self, patient_id: i64) -> RecordResult<Vec<MedicalRecord>> {
        self.store.find_by_patient(patient_id)
    }

    pub fn list_by_doctor(&self, doctor_id: i64) -> RecordResult<Vec<MedicalRecord>> {
        self.store.find_by_doctor(doctor_id)
    }

    /// Apply a partial update and persist the merged record.
    ///
    /// The merge rules live in [`MedicalRecord::apply_update`]; whatever the
    /// payload carries, the stored patient and doctor ids are preserved.
    ///
    /// # Errors
    /// Returns [`RecordError::NotFound`] when no record exists with `id`.
    pub fn update(&self, id: RecordId, update: RecordUpdate) -> RecordResult<MedicalRecord> {
        let mut existing = self.load(id)?;
        existing.apply_update(update);
        self.store.save(existing)
    }

    /// Set the therapy flag and, when a list is supplied, replace the
    /// required-therapy list.
    ///
    /// In [`AssignmentMode::Legacy`] a supplied list is acknowledged but the
    /// stored list is replaced with an empty one — the historical stub. In
    /// [`AssignmentMode::Apply`] the supplied list is stored. A `None` list
    /// leaves the stored list untouched in both modes.
    ///
    /// # Errors
    /// Returns [`RecordError::NotFound`] when no record exists with `id`.
    pub fn update_therapies(
        &self,
        id: RecordId,
        need_therapy: bool,
        therapy_ids: Option<Vec<i64>>,
    ) -> RecordResult<MedicalRecord> {
        let mut record = self.load(id)?;

        record.need_therapy = need_therapy;

        if let Some(therapy_ids) = therapy_ids {
            record.required_therapy_ids = match self.cfg.assignment_mode() {
                AssignmentMode::Legacy => Some(Vec::new()),
                AssignmentMode::Apply => Some(therapy_ids),
            };
        }

        self.store.save(record)
    }

    /// Assign a therapist to a record.
    ///
    /// In [`AssignmentMode::Legacy`] the supplied id is discarded and the
    /// stored therapist is cleared — the historical stub. In
    /// [`AssignmentMode::Apply`] the supplied id is stored.
    ///
    /// # Errors
    /// Returns [`RecordError::NotFound`] when no record exists with `id`.
    pub fn assign_therapist(
        &self,
        id: RecordId,
        therapist_id: i64,
    ) -> RecordResult<MedicalRecord> {
        let mut record = self.load(id)?;

        record.therapist_id = match self.cfg.assignment_mode() {
            AssignmentMode::Legacy => None,
            AssignmentMode::Apply => Some(therapist_id),
        };

        self.store.save(record)
    }

    /// Permanently delete a record.
    ///
    /// # Errors
    /// Returns [`RecordError::NotFound`] when no record exists with `id`.
    pub fn delete(&self, id: RecordId) -> RecordResult<()> {
        let record = self.load(id)?;
        tracing::info!(id, "deleting medical record");
        // load() guarantees the id is present.
        self.store.delete(record.id.unwrap_or(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TherapyStatus;
    use crate::store::JsonRecordStore;
    use tempfile::TempDir;

    fn service(mode: AssignmentMode) -> (TempDir, RecordService<JsonRecordStore>) {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf(), mode).unwrap());
        let store = Arc::new(JsonRecordStore::open(temp.path()).unwrap());
        (temp, RecordService::new(cfg, store))
    }

    fn draft() -> MedicalRecord {
        MedicalRecord {
            patient_id: Some(7),
            doctor_id: Some(11),
            symptoms: Some("fever".into()),
            diagnosis: Some("flu".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_nulls_identifiers_in_legacy_mode() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let created = service.create(7, draft()).unwrap();

        assert!(created.id.is_some());
        assert_eq!(created.patient_id, None);
        assert_eq!(created.doctor_id, None);
        assert_eq!(created.symptoms.as_deref(), Some("fever"));
    }

    #[test]
    fn test_create_applies_identifiers_in_apply_mode() {
        let (_temp, service) = service(AssignmentMode::Apply);

        let created = service.create(7, draft()).unwrap();

        assert_eq!(created.patient_id, Some(7));
        assert_eq!(created.doctor_id, Some(11));
    }

    #[test]
    fn test_create_then_get_round_trips() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let created = service.create(7, draft()).unwrap();
        let fetched = service.get(created.id.unwrap()).unwrap();

        assert_eq!(fetched, created);
    }

    #[test]
    fn test_update_preserves_ownership_identifiers() {
        let (_temp, service) = service(AssignmentMode::Apply);
        let created = service.create(7, draft()).unwrap();

        let update = RecordUpdate {
            patient_id: Some(99),
            doctor_id: Some(98),
            diagnosis: Some("pneumonia".into()),
            need_therapy: true,
            ..Default::default()
        };
        let updated = service.update(created.id.unwrap(), update).unwrap();

        assert_eq!(updated.patient_id, created.patient_id);
        assert_eq!(updated.doctor_id, created.doctor_id);
        assert_eq!(updated.diagnosis.as_deref(), Some("pneumonia"));
        assert!(updated.need_therapy);
    }

    #[test]
    fn test_update_persists_merged_record() {
        let (_temp, service) = service(AssignmentMode::Legacy);
        let created = service.create(7, draft()).unwrap();

        let update = RecordUpdate {
            status: Some(TherapyStatus::Active),
            rating: Some(4.5),
            ..Default::default()
        };
        service.update(created.id.unwrap(), update).unwrap();

        let fetched = service.get(created.id.unwrap()).unwrap();
        assert_eq!(fetched.status, Some(TherapyStatus::Active));
        assert_eq!(fetched.rating, Some(4.5));
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let err = service.update(42, RecordUpdate::default()).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { id: 42, .. }));
        // Nothing written.
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_therapies_stores_empty_list_in_legacy_mode() {
        let (_temp, service) = service(AssignmentMode::Legacy);
        let created = service.create(7, draft()).unwrap();

        let updated = service
            .update_therapies(created.id.unwrap(), true, Some(vec![3, 4, 5]))
            .unwrap();

        assert!(updated.need_therapy);
        assert_eq!(updated.required_therapy_ids, Some(vec![]));
    }

    #[test]
    fn test_update_therapies_stores_supplied_list_in_apply_mode() {
        let (_temp, service) = service(AssignmentMode::Apply);
        let created = service.create(7, draft()).unwrap();

        let updated = service
            .update_therapies(created.id.unwrap(), true, Some(vec![3, 4, 5]))
            .unwrap();

        assert_eq!(updated.required_therapy_ids, Some(vec![3, 4, 5]));
    }

    #[test]
    fn test_update_therapies_null_list_leaves_stored_list() {
        let (_temp, service) = service(AssignmentMode::Legacy);
        let mut record = draft();
        record.required_therapy_ids = Some(vec![1, 2]);
        let created = service.create(7, record).unwrap();

        let updated = service
            .update_therapies(created.id.unwrap(), false, None)
            .unwrap();

        assert!(!updated.need_therapy);
        assert_eq!(updated.required_therapy_ids, Some(vec![1, 2]));
    }

    #[test]
    fn test_update_therapies_missing_record_is_not_found() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let err = service.update_therapies(42, true, None).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { id: 42, .. }));
    }

    #[test]
    fn test_assign_therapist_clears_in_legacy_mode() {
        let (_temp, service) = service(AssignmentMode::Legacy);
        let mut record = draft();
        record.therapist_id = Some(2);
        let created = service.create(7, record).unwrap();

        let updated = service.assign_therapist(created.id.unwrap(), 5).unwrap();

        assert_eq!(updated.therapist_id, None);
    }

    #[test]
    fn test_assign_therapist_assigns_in_apply_mode() {
        let (_temp, service) = service(AssignmentMode::Apply);
        let created = service.create(7, draft()).unwrap();

        let updated = service.assign_therapist(created.id.unwrap(), 5).unwrap();

        assert_eq!(updated.therapist_id, Some(5));
    }

    #[test]
    fn test_assign_therapist_missing_record_is_not_found() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let err = service.assign_therapist(42, 5).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { id: 42, .. }));
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let (_temp, service) = service(AssignmentMode::Legacy);
        let created = service.create(7, draft()).unwrap();
        let id = created.id.unwrap();

        service.delete(id).unwrap();

        let err = service.get(id).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[test]
    fn test_delete_missing_record_is_not_found() {
        let (_temp, service) = service(AssignmentMode::Legacy);

        let err = service.delete(42).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { id: 42, .. }));
    }

    #[test]
    fn test_list_returns_summaries_in_storage_order() {
        let (_temp, service) = service(AssignmentMode::Apply);
        service.create(1, draft()).unwrap();
        let mut second = draft();
        second.status = Some(TherapyStatus::Completed);
        service.create(2, second).unwrap();

        let summaries = service.list().unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, Some(1));
        assert_eq!(summaries[1].id, Some(2));
        assert_eq!(summaries[1].status.as_deref(), Some("COMPLETED"));
    }

    #[test]
    fn test_list_by_patient_filters() {
        let (_temp, service) = service(AssignmentMode::Apply);
        service.create(1, draft()).unwrap();
        service.create(1, draft()).unwrap();
        service.create(2, draft()).unwrap();

        assert_eq!(service.list_by_patient(1).unwrap().len(), 2);
        assert_eq!(service.list_by_patient(3).unwrap().len(), 0);
        assert_eq!(service.list_by_doctor(11).unwrap().len(), 3);
    }
}
