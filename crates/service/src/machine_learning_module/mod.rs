//! Machine learning module resource: domain types, repository abstraction
//! with a SeaORM implementation, and the service enforcing business rules.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::MachineLearningModuleService;

pub(crate) const ENTITY: &str = "MachineLearningModule";
