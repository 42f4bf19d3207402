//! `machine_learning_module` entity: one registered model artifact.
//!
//! Field limits mirror the column sizes created by the migration crate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const VERSION_NUMBER_MAX_LEN: usize = 50;
pub const FRAMEWORK_MAX_LEN: usize = 50;
pub const TRAINING_STATUS_MAX_LEN: usize = 50;
pub const MODEL_PATH_MAX_LEN: usize = 500;

/// Initial value of the optimistic-lock counter.
pub const INITIAL_VERSION: i64 = 1;

/// `training_status` value the high-performance query treats as live.
pub const ACTIVE_STATUS: &str = "ACTIVE";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "machine_learning_module")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub description: Option<String>,
    pub version_number: String,
    pub framework: String,
    pub training_status: Option<String>,
    pub last_trained_at: Option<DateTimeWithTimeZone>,
    pub model_path: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub accuracy: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Required text column: non-blank and at most `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    validate_len(field, value, max)
}

/// Optional text column: only the length is checked.
pub fn validate_optional(field: &str, value: Option<&str>, max: usize) -> Result<(), ModelError> {
    match value {
        Some(v) => validate_len(field, v, max),
        None => Ok(()),
    }
}

pub fn validate_accuracy(value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(a) if !(0.0..=1.0).contains(&a) => {
            Err(ModelError::Validation("accuracy must be within 0.0..=1.0".into()))
        }
        _ => Ok(()),
    }
}

fn validate_len(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.chars().count() > max {
        return Err(ModelError::Validation(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(validate_required("name", "   ", NAME_MAX_LEN).is_err());
        assert!(validate_required("name", "Classifier", NAME_MAX_LEN).is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let at_limit = "é".repeat(VERSION_NUMBER_MAX_LEN);
        assert!(validate_required("versionNumber", &at_limit, VERSION_NUMBER_MAX_LEN).is_ok());
        let over = "x".repeat(VERSION_NUMBER_MAX_LEN + 1);
        let err = validate_required("versionNumber", &over, VERSION_NUMBER_MAX_LEN).unwrap_err();
        assert_eq!(err, ModelError::Validation("versionNumber must be at most 50 characters".into()));
    }

    #[test]
    fn optional_accepts_none() {
        assert!(validate_optional("description", None, DESCRIPTION_MAX_LEN).is_ok());
        let long = "d".repeat(DESCRIPTION_MAX_LEN + 1);
        assert!(validate_optional("description", Some(&long), DESCRIPTION_MAX_LEN).is_err());
    }

    #[test]
    fn accuracy_bounds() {
        assert!(validate_accuracy(None).is_ok());
        assert!(validate_accuracy(Some(0.0)).is_ok());
        assert!(validate_accuracy(Some(1.0)).is_ok());
        assert!(validate_accuracy(Some(1.5)).is_err());
        assert!(validate_accuracy(Some(f64::NAN)).is_err());
    }
}
