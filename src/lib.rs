pub mod app;
pub mod cli;
pub mod error;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod store;
pub mod term;
pub mod types;
pub mod utils;
pub mod workout;

pub use error::{Error, Result, ValidationError};
