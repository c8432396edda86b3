//! Command handlers for the fintrack CLI.
//!
//! Every operation is implemented once here. The CLI, the HTTP API and the MCP server all call
//! these functions and differ only in how they present the returned [`Out`] or [`Error`].
//!
//! [`Error`]: crate::Error

mod ask;
mod delete;
mod init;
mod insert;
mod list;
mod mcp;
mod pots;
mod serve;
mod summary;
mod update;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use crate::db::SeedCounts;
pub use ask::ask;
pub use delete::delete;
pub use init::init;
pub use insert::{insert_bill, insert_budget, insert_pot, insert_transaction};
pub use list::{
    get_bill, get_budget, get_pot, get_transaction, list_bills, list_budgets, list_pots,
    list_transactions,
};
pub use mcp::mcp;
pub use pots::{deposit, withdraw};
pub use serve::serve;
pub use summary::summary;
pub use update::{update_bill, update_budget, update_pot, update_transaction};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line, HTTP and MCP server interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Take the structured data out of the `Out`.
    pub fn into_structure(self) -> Option<T> {
        self.structure
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}
