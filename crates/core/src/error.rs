#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{kind} not found with id {id}")]
    NotFound { kind: &'static str, id: i64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove record file: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
}

impl RecordError {
    /// NotFound for a medical record, the only entity this service stores.
    pub fn record_not_found(id: i64) -> Self {
        RecordError::NotFound {
            kind: "medical record",
            id,
        }
    }
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
