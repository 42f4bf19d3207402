use std::sync::Arc;

use chrono::Utc;
use models::machine_learning_module::{self as mlm, Model, ACTIVE_STATUS, INITIAL_VERSION};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, NotSet,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::errors::ServiceError;
use crate::machine_learning_module::domain::{ModuleFields, Sort, SortField};
use crate::machine_learning_module::repository::{MachineLearningModuleRepository, NoOwners, OwnerDirectory};
use crate::machine_learning_module::ENTITY;
use crate::pagination::{Direction, Page, Pagination};

/// SeaORM-backed repository implementation.
pub struct SeaOrmMachineLearningModuleRepository {
    pub db: DatabaseConnection,
    owners: Arc<dyn OwnerDirectory>,
}

impl SeaOrmMachineLearningModuleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, owners: Arc::new(NoOwners) }
    }

    pub fn with_owner_directory(mut self, owners: Arc<dyn OwnerDirectory>) -> Self {
        self.owners = owners;
        self
    }

    /// Rows whose `col` matches `term` ignoring case, ordered by id.
    ///
    /// SQLite's `LOWER()` folds ASCII letters only, so on that backend a
    /// non-ASCII term is matched here instead of in SQL.
    async fn find_text(&self, col: mlm::Column, term: &str, how: TextMatch) -> Result<Vec<Model>, ServiceError> {
        let query = mlm::Entity::find().order_by_asc(mlm::Column::Id);
        if self.db.get_database_backend() == DbBackend::Sqlite && !term.is_ascii() {
            debug!(?col, "unicode term on sqlite, matching in process");
            let rows = query.all(&self.db).await?;
            return Ok(rows
                .into_iter()
                .filter(|m| text_column(m, col).is_some_and(|v| how.matches(v, term)))
                .collect());
        }
        Ok(query.filter(how.condition(col, term)).all(&self.db).await?)
    }
}

fn column(field: SortField) -> mlm::Column {
    match field {
        SortField::Id => mlm::Column::Id,
        SortField::Name => mlm::Column::Name,
        SortField::IsActive => mlm::Column::IsActive,
        SortField::VersionNumber => mlm::Column::VersionNumber,
        SortField::Framework => mlm::Column::Framework,
        SortField::TrainingStatus => mlm::Column::TrainingStatus,
        SortField::LastTrainedAt => mlm::Column::LastTrainedAt,
        SortField::Accuracy => mlm::Column::Accuracy,
        SortField::CreatedAt => mlm::Column::CreatedAt,
        SortField::UpdatedAt => mlm::Column::UpdatedAt,
        SortField::Version => mlm::Column::Version,
    }
}

fn order(direction: Direction) -> Order {
    match direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn lower(col: mlm::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(col)))
}

/// `LOWER(col) LIKE '%fragment%'`
fn contains_ignore_case(col: mlm::Column, fragment: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&fragment.to_lowercase()));
    lower(col).like(LikeExpr::new(pattern).escape('\\'))
}

/// `LOWER(col) = LOWER(value)`
fn eq_ignore_case(col: mlm::Column, value: &str) -> SimpleExpr {
    lower(col).eq(value.to_lowercase())
}

/// How a text column is compared to a search term, ignoring case.
#[derive(Clone, Copy, Debug)]
enum TextMatch {
    Contains,
    Exact,
}

impl TextMatch {
    fn condition(self, col: mlm::Column, term: &str) -> SimpleExpr {
        match self {
            TextMatch::Contains => contains_ignore_case(col, term),
            TextMatch::Exact => eq_ignore_case(col, term),
        }
    }

    fn matches(self, value: &str, term: &str) -> bool {
        let (value, term) = (value.to_lowercase(), term.to_lowercase());
        match self {
            TextMatch::Contains => value.contains(&term),
            TextMatch::Exact => value == term,
        }
    }
}

fn text_column(model: &Model, col: mlm::Column) -> Option<&str> {
    match col {
        mlm::Column::Name => Some(&model.name),
        mlm::Column::Framework => Some(&model.framework),
        mlm::Column::TrainingStatus => model.training_status.as_deref(),
        _ => None,
    }
}

fn fields_into_active_model(fields: ModuleFields) -> mlm::ActiveModel {
    mlm::ActiveModel {
        id: NotSet,
        name: Set(fields.name),
        is_active: Set(fields.is_active),
        description: Set(fields.description),
        version_number: Set(fields.version_number),
        framework: Set(fields.framework),
        training_status: Set(fields.training_status),
        last_trained_at: Set(fields.last_trained_at),
        model_path: Set(fields.model_path),
        accuracy: Set(fields.accuracy),
        created_at: NotSet,
        updated_at: NotSet,
        version: NotSet,
    }
}

#[async_trait::async_trait]
impl MachineLearningModuleRepository for SeaOrmMachineLearningModuleRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Model>, ServiceError> {
        Ok(mlm::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, fields: ModuleFields) -> Result<Model, ServiceError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut am = fields_into_active_model(fields);
        am.created_at = Set(now);
        am.updated_at = Set(now);
        am.version = Set(INITIAL_VERSION);
        Ok(am.insert(&self.db).await?)
    }

    async fn update(&self, id: i64, fields: ModuleFields, expected_version: i64) -> Result<Model, ServiceError> {
        let mut am = fields_into_active_model(fields);
        am.updated_at = Set(Utc::now().into());
        am.version = Set(expected_version + 1);
        let res = mlm::Entity::update_many()
            .set(am)
            .filter(mlm::Column::Id.eq(id))
            .filter(mlm::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;
        if res.rows_affected == 0 {
            // Either the row vanished or another writer bumped the version.
            return match self.find_by_id(id).await? {
                Some(current) => Err(ServiceError::stale_version(ENTITY, id, expected_version, current.version)),
                None => Err(ServiceError::not_found(ENTITY, id)),
            };
        }
        debug!(id, version = expected_version + 1, "row updated");
        self.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let res = mlm::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
        self.find_text(mlm::Column::Name, fragment, TextMatch::Contains).await
    }

    async fn find_page(&self, pagination: Pagination, sort: Sort) -> Result<Page<Model>, ServiceError> {
        let (page_idx, size) = pagination.normalize()?;
        let paginator = mlm::Entity::find()
            .order_by(column(sort.field), order(sort.direction))
            .order_by(mlm::Column::Id, order(sort.direction))
            .paginate(&self.db, size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page_idx).await?;
        Ok(Page::new(items, total, page_idx, size))
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Model>, ServiceError> {
        self.find_text(mlm::Column::TrainingStatus, status, TextMatch::Exact).await
    }

    async fn find_created_between(&self, start: DateTimeWithTimeZone, end: DateTimeWithTimeZone) -> Result<Vec<Model>, ServiceError> {
        let rows = mlm::Entity::find()
            .filter(mlm::Column::CreatedAt.between(start, end))
            .order_by_asc(mlm::Column::CreatedAt)
            .order_by_asc(mlm::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_by_framework_containing(&self, fragment: &str) -> Result<Vec<Model>, ServiceError> {
        self.find_text(mlm::Column::Framework, fragment, TextMatch::Contains).await
    }

    async fn find_by_owner_username(&self, username: &str) -> Result<Vec<Model>, ServiceError> {
        let ids = self.owners.module_ids_owned_by(username).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = mlm::Entity::find()
            .filter(mlm::Column::Id.is_in(ids))
            .order_by_asc(mlm::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(!self.find_text(mlm::Column::Name, name, TextMatch::Exact).await?.is_empty())
    }

    async fn count_created_after(&self, since: DateTimeWithTimeZone) -> Result<u64, ServiceError> {
        let n = mlm::Entity::find()
            .filter(mlm::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await?;
        Ok(n)
    }

    async fn find_high_performing_active(&self, min_accuracy: f64) -> Result<Vec<Model>, ServiceError> {
        let rows = mlm::Entity::find()
            .filter(mlm::Column::Accuracy.gt(min_accuracy))
            .filter(eq_ignore_case(mlm::Column::TrainingStatus, ACTIVE_STATUS))
            .order_by_desc(mlm::Column::Accuracy)
            .order_by_asc(mlm::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_top10_recent(&self) -> Result<Vec<Model>, ServiceError> {
        let rows = mlm::Entity::find()
            .order_by_desc(mlm::Column::CreatedAt)
            .order_by_desc(mlm::Column::Id)
            .limit(10)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_all_active(&self) -> Result<Vec<Model>, ServiceError> {
        let rows = mlm::Entity::find()
            .filter(mlm::Column::IsActive.eq(true))
            .order_by_asc(mlm::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Model>, ServiceError> {
        Ok(self.find_text(mlm::Column::Name, name, TextMatch::Exact).await?.into_iter().next())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let n = mlm::Entity::find_by_id(id).count(&self.db).await?;
        Ok(n > 0)
    }
}
