pub mod address;
pub mod analyzers;
pub mod cleaner;
pub mod config;
pub mod errors;
pub mod features;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod schema;
