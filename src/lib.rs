pub mod app;
pub mod cli;
pub mod slot;
pub mod store;
pub mod types;
pub mod utils;
pub mod workout;
