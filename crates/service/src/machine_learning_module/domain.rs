use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use models::machine_learning_module::{
    self as mlm, DESCRIPTION_MAX_LEN, FRAMEWORK_MAX_LEN, MODEL_PATH_MAX_LEN, NAME_MAX_LEN,
    TRAINING_STATUS_MAX_LEN, VERSION_NUMBER_MAX_LEN,
};

use crate::errors::ServiceError;
use crate::pagination::Direction;

/// Create/update payload as received from clients.
///
/// Server-managed fields (`id`, `createdAt`, `updatedAt`) are not part of the
/// payload and are ignored if sent. `version`, when present on an update, is
/// the version the client last read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInput {
    pub name: Option<String>,
    /// Absent or `null` means `false`.
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub version_number: Option<String>,
    pub framework: Option<String>,
    pub training_status: Option<String>,
    pub last_trained_at: Option<DateTime<FixedOffset>>,
    pub model_path: Option<String>,
    pub accuracy: Option<f64>,
    pub version: Option<i64>,
}

/// Validated column values for an insert or full-row update.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleFields {
    pub name: String,
    pub is_active: bool,
    pub description: Option<String>,
    pub version_number: String,
    pub framework: String,
    pub training_status: Option<String>,
    pub last_trained_at: Option<DateTime<FixedOffset>>,
    pub model_path: String,
    pub accuracy: Option<f64>,
}

fn required(field: &str, value: Option<String>, max: usize) -> Result<String, ServiceError> {
    let value = value.unwrap_or_default();
    mlm::validate_required(field, &value, max)?;
    Ok(value)
}

impl ModuleInput {
    /// Check every column constraint and produce the storable fields.
    pub fn validate(self) -> Result<ModuleFields, ServiceError> {
        let name = required("name", self.name, NAME_MAX_LEN)?;
        let version_number = required("versionNumber", self.version_number, VERSION_NUMBER_MAX_LEN)?;
        let framework = required("framework", self.framework, FRAMEWORK_MAX_LEN)?;
        let model_path = required("modelPath", self.model_path, MODEL_PATH_MAX_LEN)?;
        mlm::validate_optional("description", self.description.as_deref(), DESCRIPTION_MAX_LEN)?;
        mlm::validate_optional("trainingStatus", self.training_status.as_deref(), TRAINING_STATUS_MAX_LEN)?;
        mlm::validate_accuracy(self.accuracy)?;
        Ok(ModuleFields {
            name,
            is_active: self.is_active.unwrap_or(false),
            description: self.description,
            version_number,
            framework,
            training_status: self.training_status,
            last_trained_at: self.last_trained_at,
            model_path,
            accuracy: self.accuracy,
        })
    }
}

/// Columns a page can be ordered by, named as they appear in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Name,
    IsActive,
    VersionNumber,
    Framework,
    TrainingStatus,
    LastTrainedAt,
    Accuracy,
    #[default]
    CreatedAt,
    UpdatedAt,
    Version,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        let field = match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "isActive" => SortField::IsActive,
            "versionNumber" => SortField::VersionNumber,
            "framework" => SortField::Framework,
            "trainingStatus" => SortField::TrainingStatus,
            "lastTrainedAt" => SortField::LastTrainedAt,
            "accuracy" => SortField::Accuracy,
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "version" => SortField::Version,
            _ => return None,
        };
        Some(field)
    }

    /// Ascending comparison on this column, for in-memory ordering.
    pub fn compare(self, a: &mlm::Model, b: &mlm::Model) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::IsActive => a.is_active.cmp(&b.is_active),
            SortField::VersionNumber => a.version_number.cmp(&b.version_number),
            SortField::Framework => a.framework.cmp(&b.framework),
            SortField::TrainingStatus => a.training_status.cmp(&b.training_status),
            SortField::LastTrainedAt => a.last_trained_at.cmp(&b.last_trained_at),
            SortField::Accuracy => a.accuracy.partial_cmp(&b.accuracy).unwrap_or(Ordering::Equal),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Version => a.version.cmp(&b.version),
        }
    }
}

/// Requested ordering; ties are broken by id in the same direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl FromStr for Sort {
    type Err = ServiceError;

    /// Accepts `field` or `field,asc|desc`. A bare field sorts ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let field_name = parts.next().unwrap_or_default();
        let field = SortField::parse(field_name)
            .ok_or_else(|| ServiceError::Validation(format!("unknown sort field '{}'", field_name)))?;
        let direction = match parts.next() {
            None | Some("") => Direction::Asc,
            Some(d) => Direction::parse(d)
                .ok_or_else(|| ServiceError::Validation(format!("unknown sort direction '{}'", d)))?,
        };
        if parts.next().is_some() {
            return Err(ServiceError::Validation(format!("malformed sort '{}'", s)));
        }
        Ok(Sort { field, direction })
    }
}

impl Sort {
    /// Full ordering including the id tie-breaker.
    pub fn compare(&self, a: &mlm::Model, b: &mlm::Model) -> Ordering {
        let asc = self.field.compare(a, b).then_with(|| a.id.cmp(&b.id));
        match self.direction {
            Direction::Asc => asc,
            Direction::Desc => asc.reverse(),
        }
    }
}
