use std::sync::Arc;

use models::machine_learning_module::Model;
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::{info, instrument, warn};

use super::domain::{ModuleInput, Sort};
use super::repository::MachineLearningModuleRepository;
use super::ENTITY;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Application service for machine learning module records.
/// Enforces payload presence, existence and version checks; everything
/// else is delegated to the repository.
pub struct MachineLearningModuleService<R: MachineLearningModuleRepository> {
    repo: Arc<R>,
}

impl<R: MachineLearningModuleRepository> MachineLearningModuleService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Validate and persist a new record.
    ///
    /// # Examples
    /// ```
    /// use service::machine_learning_module::{domain::ModuleInput, repository::mock::MockMachineLearningModuleRepository, MachineLearningModuleService};
    /// use std::sync::Arc;
    /// let svc = MachineLearningModuleService::new(Arc::new(MockMachineLearningModuleRepository::default()));
    /// let input = ModuleInput {
    ///     name: Some("Classifier".into()),
    ///     version_number: Some("1.0".into()),
    ///     framework: Some("CNN".into()),
    ///     model_path: Some("/models/c1".into()),
    ///     ..ModuleInput::default()
    /// };
    /// let created = tokio_test::block_on(svc.create(Some(input))).unwrap();
    /// assert_eq!(created.id, 1);
    /// assert_eq!(created.created_at, created.updated_at);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: Option<ModuleInput>) -> Result<Model, ServiceError> {
        let input = input.ok_or_else(|| ServiceError::Validation(format!("{ENTITY} entity cannot be null")))?;
        let fields = input.validate()?;
        let created = self.repo.insert(fields).await?;
        info!(id = created.id, name = %created.name, "ml_module_created");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Model>, ServiceError> { self.repo.find_by_id(id).await }

    pub async fn list(&self, pagination: Pagination, sort: Sort) -> Result<Page<Model>, ServiceError> {
        self.repo.find_page(pagination, sort).await
    }

    /// Overwrite every mutable field of an existing record.
    ///
    /// A `version` in the payload must match the stored one; without it the
    /// version read here is used, which still catches writers racing between
    /// this read and the write.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: Option<ModuleInput>) -> Result<Model, ServiceError> {
        let existing = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
        let input = input.ok_or_else(|| ServiceError::Validation(format!("{ENTITY} entity cannot be null")))?;
        let expected = input.version.unwrap_or(existing.version);
        if expected != existing.version {
            warn!(id, expected, actual = existing.version, "ml_module_stale_update");
            return Err(ServiceError::stale_version(ENTITY, id, expected, existing.version));
        }
        let fields = input.validate()?;
        let updated = self.repo.update(id, fields, expected).await?;
        info!(id, version = updated.version, "ml_module_updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(ServiceError::not_found(ENTITY, id));
        }
        if !self.repo.delete_by_id(id).await? {
            // removed by someone else in between
            return Err(ServiceError::not_found(ENTITY, id));
        }
        info!(id, "ml_module_deleted");
        Ok(())
    }

    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
        self.repo.search_by_name(fragment).await
    }

    pub async fn find_all_active(&self) -> Result<Vec<Model>, ServiceError> { self.repo.find_all_active().await }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Model>, ServiceError> { self.repo.find_by_name(name).await }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> { self.repo.exists_by_name(name).await }

    pub async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> { self.repo.exists_by_id(id).await }

    pub async fn find_by_status(&self, status: &str) -> Result<Vec<Model>, ServiceError> { self.repo.find_by_status(status).await }

    pub async fn find_created_between(&self, start: DateTimeWithTimeZone, end: DateTimeWithTimeZone) -> Result<Vec<Model>, ServiceError> {
        if start > end {
            return Err(ServiceError::Validation("start must not be after end".into()));
        }
        self.repo.find_created_between(start, end).await
    }

    pub async fn find_by_model_type(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
        self.repo.find_by_framework_containing(fragment).await
    }

    pub async fn find_by_owner_username(&self, username: &str) -> Result<Vec<Model>, ServiceError> {
        self.repo.find_by_owner_username(username).await
    }

    pub async fn count_created_after(&self, since: DateTimeWithTimeZone) -> Result<u64, ServiceError> {
        self.repo.count_created_after(since).await
    }

    pub async fn find_high_performing_active(&self, min_accuracy: f64) -> Result<Vec<Model>, ServiceError> {
        self.repo.find_high_performing_active(min_accuracy).await
    }

    pub async fn find_top10_recent(&self) -> Result<Vec<Model>, ServiceError> { self.repo.find_top10_recent().await }
}
