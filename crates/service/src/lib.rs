//! Service layer for machine learning module records.
//! - Separates business rules (presence, existence, version checks) from data access.
//! - Reuses the entity and field validation from the `models` crate.
//! - Storage sits behind the `MachineLearningModuleRepository` trait.

pub mod errors;
pub mod pagination;
pub mod machine_learning_module;
#[cfg(test)]
pub mod test_support;
