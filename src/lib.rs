pub mod config;
pub mod errors;
pub mod hug;
pub mod logging;
