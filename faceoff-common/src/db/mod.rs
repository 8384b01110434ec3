//! Database access layer

pub mod init;
pub mod models;

pub use init::{create_tables, init_database};
