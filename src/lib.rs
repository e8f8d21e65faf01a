pub mod cli;
pub mod controller;
pub mod error;
pub mod persistence;
pub mod present;
pub mod store;
pub mod types;
pub mod utils;
