//! fintrack: transactions, budgets, savings pots and recurring bills stored in SQLite, with an
//! AI advisor. The same commands are served over HTTP, the command line and MCP.

mod advisor;
pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod mcp;
pub mod model;
mod utils;
mod web;


pub use advisor::{AdvisorConfig, Mode, Role, Turn};
pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use model::Amount;
