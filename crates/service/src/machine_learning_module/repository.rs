use std::collections::HashMap;

use async_trait::async_trait;
use models::machine_learning_module::Model;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::domain::{ModuleFields, Sort};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Storage contract for module records: one method per query shape.
///
/// Implementations report a missing row on `update` as `NotFound` and a
/// version mismatch as `Conflict`.
#[async_trait]
pub trait MachineLearningModuleRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Model>, ServiceError>;
    /// Insert with server-assigned id, timestamps and initial version.
    async fn insert(&self, fields: ModuleFields) -> Result<Model, ServiceError>;
    /// Overwrite every mutable column if the stored version equals `expected_version`.
    async fn update(&self, id: i64, fields: ModuleFields, expected_version: i64) -> Result<Model, ServiceError>;
    /// Returns true if a row was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError>;
    /// Case-insensitive substring match on `name`.
    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Model>, ServiceError>;
    async fn find_page(&self, pagination: Pagination, sort: Sort) -> Result<Page<Model>, ServiceError>;

    /// Case-insensitive exact match on `training_status`.
    async fn find_by_status(&self, status: &str) -> Result<Vec<Model>, ServiceError>;
    /// `created_at` within `[start, end]`.
    async fn find_created_between(&self, start: DateTimeWithTimeZone, end: DateTimeWithTimeZone) -> Result<Vec<Model>, ServiceError>;
    /// Case-insensitive substring match on `framework` (the model type).
    async fn find_by_framework_containing(&self, fragment: &str) -> Result<Vec<Model>, ServiceError>;
    async fn find_by_owner_username(&self, username: &str) -> Result<Vec<Model>, ServiceError>;
    async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError>;
    /// Rows with `created_at >= since`.
    async fn count_created_after(&self, since: DateTimeWithTimeZone) -> Result<u64, ServiceError>;
    /// `accuracy > min_accuracy` with an ACTIVE training status, best first.
    async fn find_high_performing_active(&self, min_accuracy: f64) -> Result<Vec<Model>, ServiceError>;
    async fn find_top10_recent(&self) -> Result<Vec<Model>, ServiceError>;
    /// Rows with `is_active = true`.
    async fn find_all_active(&self) -> Result<Vec<Model>, ServiceError>;
    /// Case-insensitive exact match on `name`.
    async fn find_by_name(&self, name: &str) -> Result<Option<Model>, ServiceError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError>;
}

/// Resolves module ownership. Owners live outside this schema, so the
/// owner-username query asks a directory for the module ids instead of
/// joining.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn module_ids_owned_by(&self, username: &str) -> Result<Vec<i64>, ServiceError>;
}

/// Directory with no owners; every lookup is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOwners;

#[async_trait]
impl OwnerDirectory for NoOwners {
    async fn module_ids_owned_by(&self, _username: &str) -> Result<Vec<i64>, ServiceError> {
        Ok(Vec::new())
    }
}

/// Fixed username → module ids table.
#[derive(Debug, Default, Clone)]
pub struct StaticOwnerDirectory {
    owners: HashMap<String, Vec<i64>>,
}

impl StaticOwnerDirectory {
    pub fn with_owner(mut self, username: &str, module_ids: impl IntoIterator<Item = i64>) -> Self {
        self.owners.entry(username.to_string()).or_default().extend(module_ids);
        self
    }
}

#[async_trait]
impl OwnerDirectory for StaticOwnerDirectory {
    async fn module_ids_owned_by(&self, username: &str) -> Result<Vec<i64>, ServiceError> {
        Ok(self.owners.get(username).cloned().unwrap_or_default())
    }
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

    use chrono::Utc;
    use models::machine_learning_module::{ACTIVE_STATUS, INITIAL_VERSION};

    use crate::machine_learning_module::domain::SortField;
    use crate::machine_learning_module::ENTITY;
    use crate::pagination::Direction;

    #[derive(Default)]
    struct Table {
        rows: BTreeMap<i64, Model>,
        last_id: i64,
    }

    pub struct MockMachineLearningModuleRepository {
        table: Mutex<Table>,
        owners: Arc<dyn OwnerDirectory>,
    }

    impl Default for MockMachineLearningModuleRepository {
        fn default() -> Self {
            Self { table: Mutex::default(), owners: Arc::new(NoOwners) }
        }
    }

    impl MockMachineLearningModuleRepository {
        pub fn with_owner_directory(mut self, owners: Arc<dyn OwnerDirectory>) -> Self {
            self.owners = owners;
            self
        }

        /// Replace a stored row verbatim, e.g. to simulate a concurrent writer.
        pub fn put(&self, model: Model) {
            let mut table = self.table();
            table.last_id = table.last_id.max(model.id);
            table.rows.insert(model.id, model);
        }

        fn table(&self) -> MutexGuard<'_, Table> {
            self.table.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn select(&self, pred: impl Fn(&Model) -> bool) -> Vec<Model> {
            self.table().rows.values().filter(|m| pred(m)).cloned().collect()
        }
    }

    fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    fn newest_first() -> Sort {
        Sort { field: SortField::CreatedAt, direction: Direction::Desc }
    }

    fn apply(model: &mut Model, fields: ModuleFields) {
        model.name = fields.name;
        model.is_active = fields.is_active;
        model.description = fields.description;
        model.version_number = fields.version_number;
        model.framework = fields.framework;
        model.training_status = fields.training_status;
        model.last_trained_at = fields.last_trained_at;
        model.model_path = fields.model_path;
        model.accuracy = fields.accuracy;
    }

    #[async_trait]
    impl MachineLearningModuleRepository for MockMachineLearningModuleRepository {
        async fn find_by_id(&self, id: i64) -> Result<Option<Model>, ServiceError> {
            Ok(self.table().rows.get(&id).cloned())
        }

        async fn insert(&self, fields: ModuleFields) -> Result<Model, ServiceError> {
            let mut table = self.table();
            table.last_id += 1;
            let now = Utc::now().into();
            let mut model = Model {
                id: table.last_id,
                name: String::new(),
                is_active: false,
                description: None,
                version_number: String::new(),
                framework: String::new(),
                training_status: None,
                last_trained_at: None,
                model_path: String::new(),
                accuracy: None,
                created_at: now,
                updated_at: now,
                version: INITIAL_VERSION,
            };
            apply(&mut model, fields);
            table.rows.insert(model.id, model.clone());
            Ok(model)
        }

        async fn update(&self, id: i64, fields: ModuleFields, expected_version: i64) -> Result<Model, ServiceError> {
            let mut table = self.table();
            let model = table.rows.get_mut(&id).ok_or_else(|| ServiceError::not_found(ENTITY, id))?;
            if model.version != expected_version {
                return Err(ServiceError::stale_version(ENTITY, id, expected_version, model.version));
            }
            apply(model, fields);
            model.updated_at = Utc::now().into();
            model.version += 1;
            Ok(model.clone())
        }

        async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
            Ok(self.table().rows.remove(&id).is_some())
        }

        async fn search_by_name(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
            Ok(self.select(|m| contains_ignore_case(&m.name, fragment)))
        }

        async fn find_page(&self, pagination: Pagination, sort: Sort) -> Result<Page<Model>, ServiceError> {
            let (page, size) = pagination.normalize()?;
            let mut all = self.select(|_| true);
            all.sort_by(|a, b| sort.compare(a, b));
            let total = all.len() as u64;
            let items = all
                .into_iter()
                .skip(usize::try_from(page * size).unwrap_or(usize::MAX))
                .take(size as usize)
                .collect();
            Ok(Page::new(items, total, page, size))
        }

        async fn find_by_status(&self, status: &str) -> Result<Vec<Model>, ServiceError> {
            Ok(self.select(|m| m.training_status.as_deref().is_some_and(|s| s.to_lowercase() == status.to_lowercase())))
        }

        async fn find_created_between(&self, start: DateTimeWithTimeZone, end: DateTimeWithTimeZone) -> Result<Vec<Model>, ServiceError> {
            Ok(self.select(|m| m.created_at >= start && m.created_at <= end))
        }

        async fn find_by_framework_containing(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
            Ok(self.select(|m| contains_ignore_case(&m.framework, fragment)))
        }

        async fn find_by_owner_username(&self, username: &str) -> Result<Vec<Model>, ServiceError> {
            let ids = self.owners.module_ids_owned_by(username).await?;
            Ok(self.select(|m| ids.contains(&m.id)))
        }

        async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> {
            Ok(self.find_by_name(name).await?.is_some())
        }

        async fn count_created_after(&self, since: DateTimeWithTimeZone) -> Result<u64, ServiceError> {
            Ok(self.select(|m| m.created_at >= since).len() as u64)
        }

        async fn find_high_performing_active(&self, min_accuracy: f64) -> Result<Vec<Model>, ServiceError> {
            let mut rows = self.select(|m| {
                m.accuracy.is_some_and(|a| a > min_accuracy)
                    && m.training_status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(ACTIVE_STATUS))
            });
            rows.sort_by(|a, b| SortField::Accuracy.compare(b, a));
            Ok(rows)
        }

        async fn find_top10_recent(&self) -> Result<Vec<Model>, ServiceError> {
            let mut rows = self.select(|_| true);
            let order = newest_first();
            rows.sort_by(|a, b| order.compare(a, b));
            rows.truncate(10);
            Ok(rows)
        }

        async fn find_all_active(&self) -> Result<Vec<Model>, ServiceError> {
            Ok(self.select(|m| m.is_active))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Model>, ServiceError> {
            Ok(self.select(|m| m.name.to_lowercase() == name.to_lowercase()).into_iter().next())
        }

        async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
            Ok(self.table().rows.contains_key(&id))
        }
    }
}
