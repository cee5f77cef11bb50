pub mod cli;
pub mod config;
pub mod crypto;
pub mod driver;
pub mod errors;
pub mod vault;
