//! Durable keyed storage for medical records.
//!
//! [`RecordStore`] is the narrow persistence contract the service layer
//! depends on. [`JsonRecordStore`] is the shipped implementation: one JSON
//! file per record under `<data_dir>/records/`, with sequential ids handed
//! out by an in-process counter seeded from the directory at open.
//!
//! Each service operation is a single read-modify-write against this store.
//! There is no optimistic or pessimistic concurrency control; two concurrent
//! updates to the same record are last-write-wins.

use crate::error::{RecordError, RecordResult};
use crate::record::{MedicalRecord, RecordId};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RECORDS_DIR_NAME: &str = "records";

/// Persistence contract for medical records.
///
/// `save` inserts when the record has no id (assigning one) and fully
/// overwrites the stored row otherwise; it returns the stored record.
pub trait RecordStore {
    fn find_by_id(&self, id: RecordId) -> RecordResult<Option<MedicalRecord>>;
    fn find_by_patient(&self, patient_id: i64) -> RecordResult<Vec<MedicalRecord>>;
    fn find_by_doctor(&self, doctor_id: i64) -> RecordResult<Vec<MedicalRecord>>;
    fn find_all(&self) -> RecordResult<Vec<MedicalRecord>>;
    fn save(&self, record: MedicalRecord) -> RecordResult<MedicalRecord>;
    fn delete(&self, id: RecordId) -> RecordResult<()>;
}

/// File-per-record JSON store.
#[derive(Debug)]
pub struct JsonRecordStore {
    records_dir: PathBuf,
    next_id: Mutex<RecordId>,
}

impl JsonRecordStore {
    /// Open (or create) the store under `data_dir`.
    ///
    /// Seeds the id counter from the highest id already on disk, so reopening
    /// an existing data directory never reissues an id.
    pub fn open(data_dir: &Path) -> RecordResult<Self> {
        let records_dir = data_dir.join(RECORDS_DIR_NAME);
        fs::create_dir_all(&records_dir).map_err(RecordError::StorageDirCreation)?;

        let mut max_id: RecordId = 0;
        for entry in fs::read_dir(&records_dir).map_err(RecordError::FileRead)? {
            let entry = entry.map_err(RecordError::FileRead)?;
            if let Some(id) = record_id_from_path(&entry.path()) {
                max_id = max_id.max(id);
            }
        }

        Ok(Self {
            records_dir,
            next_id: Mutex::new(max_id + 1),
        })
    }

    fn record_path(&self, id: RecordId) -> PathBuf {
        self.records_dir.join(format!("{}.json", id))
    }

    fn allocate_id(&self) -> RecordId {
        // A poisoned lock still holds a valid counter value.
        let mut next = self
            .next_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = *next;
        *next += 1;
        id
    }

    fn read_record(&self, path: &Path) -> RecordResult<MedicalRecord> {
        let contents = fs::read_to_string(path).map_err(RecordError::FileRead)?;
        serde_json::from_str(&contents).map_err(RecordError::Deserialization)
    }

    /// All records on disk, ordered by id. Ids are allocated sequentially, so
    /// this is insertion order. Unparseable files are skipped with a warning
    /// rather than failing the whole listing.
    fn scan(&self) -> RecordResult<Vec<MedicalRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.records_dir).map_err(RecordError::FileRead)? {
            let entry = entry.map_err(RecordError::FileRead)?;
            let path = entry.path();
            if record_id_from_path(&path).is_none() {
                continue;
            }

            match self.read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping unreadable record file {}: {}", path.display(), e);
                }
            }
        }

        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}

fn record_id_from_path(path: &Path) -> Option<RecordId> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<RecordId>().ok())
}

impl RecordStore for JsonRecordStore {
    fn find_by_id(&self, id: RecordId) -> RecordResult<Option<MedicalRecord>> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        self.read_record(&path).map(Some)
    }

    fn find_by_patient(&self, patient_id: i64) -> RecordResult<Vec<MedicalRecord>> {
        let mut records = self.scan()?;
        records.retain(|r| r.patient_id == Some(patient_id));
        Ok(records)
    }

    fn find_by_doctor(&self, doctor_id: i64) -> RecordResult<Vec<MedicalRecord>> {
        let mut records = self.scan()?;
        records.retain(|r| r.doctor_id == Some(doctor_id));
        Ok(records)
    }

    fn find_all(&self) -> RecordResult<Vec<MedicalRecord>> {
        self.scan()
    }

    fn save(&self, mut record: MedicalRecord) -> RecordResult<MedicalRecord> {
        let id = match record.id {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                record.id = Some(id);
                id
            }
        };

        let contents =
            serde_json::to_string_pretty(&record).map_err(RecordError::Serialization)?;
        fs::write(self.record_path(id), contents).map_err(RecordError::FileWrite)?;

        Ok(record)
    }

    fn delete(&self, id: RecordId) -> RecordResult<()> {
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RecordError::record_not_found(id))
            }
            Err(e) => Err(RecordError::FileRemove(e)),
        }
    }
}
