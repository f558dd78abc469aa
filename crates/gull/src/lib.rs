pub mod agent;
pub mod errors;
pub mod formatting;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod tools;
