use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::machine_learning_module::repo::seaorm::SeaOrmMachineLearningModuleRepository;
use service::machine_learning_module::MachineLearningModuleService;

pub type ModuleService = MachineLearningModuleService<SeaOrmMachineLearningModuleRepository>;

#[derive(Clone)]
pub struct ServerState {
    pub modules: Arc<ModuleService>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmMachineLearningModuleRepository::new(db));
        Self { modules: Arc::new(MachineLearningModuleService::new(repo)) }
    }
}
