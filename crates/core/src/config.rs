//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services as an `Arc`. Request handlers never read process-wide
//! environment variables, which keeps behaviour consistent across
//! multi-threaded runtimes and test harnesses.

use crate::error::{RecordError, RecordResult};
use std::path::{Path, PathBuf};

/// Policy switch for the assignment operations inherited from the original
/// system, where three code paths accept identifiers they never store:
/// creation drops the supplied patient/doctor ids, the therapy update stores
/// an empty list, and therapist assignment clears the therapist.
///
/// `Legacy` reproduces that observed behaviour and is the default; `Apply`
/// actually stores the supplied values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssignmentMode {
    #[default]
    Legacy,
    Apply,
}

impl std::str::FromStr for AssignmentMode {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(AssignmentMode::Legacy),
            "apply" => Ok(AssignmentMode::Apply),
            other => Err(RecordError::InvalidInput(format!(
                "unknown assignment mode '{}' (expected 'legacy' or 'apply')",
                other
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    record_data_dir: PathBuf,
    assignment_mode: AssignmentMode,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(record_data_dir: PathBuf, assignment_mode: AssignmentMode) -> RecordResult<Self> {
        if record_data_dir.as_os_str().is_empty() {
            return Err(RecordError::InvalidInput(
                "record_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            record_data_dir,
            assignment_mode,
        })
    }

    pub fn record_data_dir(&self) -> &Path {
        &self.record_data_dir
    }

    pub fn assignment_mode(&self) -> AssignmentMode {
        self.assignment_mode
    }
}

/// Parse the assignment mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the legacy default.
pub fn assignment_mode_from_env_value(value: Option<String>) -> RecordResult<AssignmentMode> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<AssignmentMode>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}
