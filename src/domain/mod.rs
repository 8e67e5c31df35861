pub mod endpoint;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod settings;
pub mod switcher;

#[cfg(test)]
pub(crate) mod fake;
