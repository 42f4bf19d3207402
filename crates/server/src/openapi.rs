use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct ErrorDoc { pub error: String, pub message: String }

/// Create/update payload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInputDoc {
    pub name: String,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub version_number: String,
    pub framework: String,
    pub training_status: Option<String>,
    /// RFC 3339 timestamp
    pub last_trained_at: Option<String>,
    pub model_path: String,
    pub accuracy: Option<f64>,
    /// version last read; a mismatch yields 409
    pub version: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDoc {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub description: Option<String>,
    pub version_number: String,
    pub framework: String,
    pub training_status: Option<String>,
    pub last_trained_at: Option<String>,
    pub model_path: String,
    pub accuracy: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModulePageDoc {
    pub items: Vec<ModuleDoc>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::machine_learning_modules::create,
        crate::routes::machine_learning_modules::get,
        crate::routes::machine_learning_modules::list,
        crate::routes::machine_learning_modules::update,
        crate::routes::machine_learning_modules::delete,
        crate::routes::machine_learning_modules::search,
    ),
    components(schemas(HealthResponse, ErrorDoc, ModuleInputDoc, ModuleDoc, ModulePageDoc)),
    tags((name = "health"), (name = "ml-module"))
)]
pub struct ApiDoc;
