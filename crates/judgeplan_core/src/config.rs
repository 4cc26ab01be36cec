//! Planning policy settings.
//!
//! # Responsibility
//! - Hold the batch size, coverage minimum, and per-type quota table.
//! - Load overrides from JSON with every field defaulted.
//!
//! # Invariants
//! - `batch_size` is at least 1.
//! - The quota table has an entry for every `CategoryType`.

use crate::engine::error::PlanningError;
use crate::model::category::CategoryType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_MINIMUM_JUDGES_PER_PROJECT: usize = 6;

/// Engine policy for one planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Maximum rows per assignment insert statement.
    pub batch_size: usize,
    /// Judges every project must be seen by, summed across its submissions.
    pub minimum_judges_per_project: usize,
    /// Groups assigned per submission, by category type.
    pub quota_by_category_type: BTreeMap<CategoryType, usize>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            minimum_judges_per_project: DEFAULT_MINIMUM_JUDGES_PER_PROJECT,
            quota_by_category_type: default_quota_table(),
        }
    }
}

impl PlanningConfig {
    /// Parses a JSON document; absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PlanningError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| PlanningError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PlanningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            PlanningError::InvalidConfig(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.batch_size == 0 {
            return Err(PlanningError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        for kind in CategoryType::ALL {
            if !self.quota_by_category_type.contains_key(&kind) {
                return Err(PlanningError::InvalidConfig(format!(
                    "quota_by_category_type is missing `{}`",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Groups per submission for `kind`.
    pub fn quota_for(&self, kind: CategoryType) -> usize {
        self.quota_by_category_type
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }
}

fn default_quota_table() -> BTreeMap<CategoryType, usize> {
    BTreeMap::from([
        (CategoryType::General, 1),
        (CategoryType::Inhouse, 2),
        (CategoryType::Sponsor, 1),
        (CategoryType::Mlh, 0),
    ])
}

#[cfg(test)]
mod tests {
    use super::PlanningConfig;
    use crate::engine::error::{PlanningError, PlanningErrorKind};
    use crate::model::category::CategoryType;

    #[test]
    fn defaults_match_event_policy() {
        let config = PlanningConfig::default();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.minimum_judges_per_project, 6);
        assert_eq!(config.quota_for(CategoryType::Inhouse), 2);
        assert_eq!(config.quota_for(CategoryType::General), 1);
        assert_eq!(config.quota_for(CategoryType::Sponsor), 1);
        assert_eq!(config.quota_for(CategoryType::Mlh), 0);
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = PlanningConfig::from_json_str(r#"{"minimum_judges_per_project": 4}"#).unwrap();
        assert_eq!(config.minimum_judges_per_project, 4);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.quota_for(CategoryType::Inhouse), 2);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = PlanningConfig::from_json_str(r#"{"batch_size": 0}"#).unwrap_err();
        assert_eq!(err.kind(), PlanningErrorKind::Configuration);
    }

    #[test]
    fn incomplete_quota_table_is_rejected() {
        let err = PlanningConfig::from_json_str(
            r#"{"quota_by_category_type": {"general": 1, "inhouse": 3}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfig(message) if message.contains("sponsor")));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = PlanningConfig::from_json_str("{batch_size:").unwrap_err();
        assert_eq!(err.kind(), PlanningErrorKind::Configuration);
    }
}
