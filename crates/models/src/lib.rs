pub mod errors;
pub mod db;
pub mod machine_learning_module;

#[cfg(test)]
mod tests;
