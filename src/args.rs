//! These structs provide the CLI interface for the fintrack CLI. The argument structs for the
//! individual operations double as MCP tool parameters, so they also derive `serde` and
//! `JsonSchema`.

use crate::advisor::Turn;
use crate::model::{Amount, BillStatus};
use clap::{Parser, Subcommand, ValueEnum};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fintrack: keep track of your money.
///
/// fintrack stores your transactions, budgets, savings pots and recurring bills in a local
/// SQLite database and computes how much of each budget you have spent, how close each pot is to
/// its target and what your balance is.
///
/// The same data can be served to a web front end (`fintrack serve`), used by an AI agent
/// (`fintrack mcp`) or edited directly from the command line. `fintrack ask` sends your question,
/// together with a summary of your finances, to a Google Gemini model.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/fintrack;
    /// pass --fintrack-home (or set FINTRACK_HOME) to put it somewhere else. Pass --seed to fill
    /// the new database with a small set of demo records.
    Init(InitArgs),
    /// Serve the JSON HTTP API used by the web front end.
    Serve(ServeArgs),
    /// Run an MCP server over stdio so that an AI agent can work with your data.
    Mcp(McpArgs),
    /// List all records of one kind.
    List(ListArgs),
    /// Show one record.
    Get(EntityIdArgs),
    /// Add a record.
    Insert(InsertArgs),
    /// Change some fields of a record. Fields you leave out keep their current value.
    Update(UpdateArgs),
    /// Remove a record.
    Delete(EntityIdArgs),
    /// Add money to a savings pot.
    Deposit(PotFundsArgs),
    /// Take money out of a savings pot. The pot total never drops below zero.
    Withdraw(PotFundsArgs),
    /// Show balance, budget, bill and savings totals.
    Summary,
    /// Ask the financial advisor a question about your money.
    Ask(AskArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fintrack data and configuration is held. Defaults to ~/fintrack
    #[arg(long, env = "FINTRACK_HOME", default_value_t = default_fintrack_home())]
    fintrack_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fintrack_home: PathBuf) -> Self {
        Self {
            log_level,
            fintrack_home: fintrack_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fintrack_home(&self) -> &DisplayPath {
        &self.fintrack_home
    }
}

/// Args for the `fintrack init` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InitArgs {
    /// Insert demo budgets, pots, bills and transactions into the new database.
    #[arg(long)]
    pub seed: bool,
}

/// Args for the `fintrack serve` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ServeArgs {
    /// The address to listen on, e.g. 127.0.0.1:8000. Defaults to the `bind` value in
    /// config.json.
    #[arg(long)]
    pub bind: Option<String>,
}

/// Args for the `fintrack mcp` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct McpArgs {}

/// The kinds of records that fintrack stores.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Transactions,
    Budgets,
    Pots,
    #[value(alias = "recurring-bills")]
    #[serde(alias = "recurring_bills")]
    Bills,
}

serde_plain::derive_display_from_serialize!(Entity);
serde_plain::derive_fromstr_from_deserialize!(Entity);

/// Args for the `fintrack list` command.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListArgs {
    /// What to list.
    pub entity: Entity,
}

/// Selects one record of one kind. Used by `fintrack get` and `fintrack delete`.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityIdArgs {
    /// The kind of record.
    pub entity: Entity,

    /// The record's id.
    #[arg(long)]
    pub id: i64,
}

/// Identifies a single record.
#[derive(Debug, Parser, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct IdArgs {
    /// The record's id.
    #[arg(long)]
    pub id: i64,
}

/// Args for the `fintrack insert` command.
#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Record an income (positive amount) or an expense (negative amount).
    Transaction(InsertTransactionArgs),
    /// Create a spending limit for a category.
    Budget(InsertBudgetArgs),
    /// Create a savings pot. New pots start empty.
    Pot(InsertPotArgs),
    /// Create a recurring bill.
    Bill(InsertBillArgs),
}

/// Fields of a new transaction.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InsertTransactionArgs {
    /// Who the money came from or went to, e.g. "Savory Bites Bistro".
    #[arg(long)]
    pub name: String,

    /// The category. Budgets match transactions by exact category name.
    #[arg(long)]
    pub category: String,

    /// Signed amount: positive for income, negative for an expense.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: Amount,

    /// The date of the transaction, YYYY-MM-DD.
    #[arg(long)]
    pub date: String,

    /// URL of an avatar image. Generated from the name when omitted.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Whether this transaction repeats. Defaults to false.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

/// Fields of a new budget.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InsertBudgetArgs {
    /// The transaction category this budget tracks.
    #[arg(long)]
    pub category: String,

    /// The spending limit, zero or greater.
    #[arg(long)]
    pub maximum: Amount,

    /// Display color, e.g. #277C78.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Fields of a new savings pot.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InsertPotArgs {
    /// The name of the pot, e.g. "New Laptop".
    #[arg(long)]
    pub name: String,

    /// How much you want to save, zero or greater.
    #[arg(long)]
    pub target: Amount,

    /// Display color, e.g. #277C78.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Fields of a new recurring bill.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InsertBillArgs {
    /// The name of the bill, e.g. "Spotify Premium".
    #[arg(long)]
    pub name: String,

    /// How much the bill costs, zero or greater.
    #[arg(long)]
    pub amount: Amount,

    /// Day of the month the bill is due, 1 to 31.
    #[arg(long)]
    pub due_day: i64,

    /// Either paid or upcoming.
    #[arg(long)]
    pub status: BillStatus,

    /// A short logo, usually an emoji.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Display color. Defaults to #000000.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Args for the `fintrack update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    Transaction(UpdateTransactionArgs),
    Budget(UpdateBudgetArgs),
    Pot(UpdatePotArgs),
    Bill(UpdateBillArgs),
}

/// The fields of a transaction that can be changed. Omitted fields are left alone.
#[derive(Debug, Parser, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionUpdates {
    /// New name. The generated avatar follows the name unless an avatar is given too.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Signed amount: positive for income, negative for an expense.
    #[arg(long, allow_hyphen_values = true)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// YYYY-MM-DD
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

impl TransactionUpdates {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Args for updating a transaction.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTransactionArgs {
    /// The id of the transaction to change.
    #[arg(long)]
    pub id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: TransactionUpdates,
}

/// The fields of a budget that can be changed. Omitted fields are left alone.
#[derive(Debug, Parser, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetUpdates {
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Amount>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl BudgetUpdates {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Args for updating a budget.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateBudgetArgs {
    /// The id of the budget to change.
    #[arg(long)]
    pub id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: BudgetUpdates,
}

/// The fields of a pot that can be changed. Omitted fields are left alone.
#[derive(Debug, Parser, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PotUpdates {
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Amount>,

    /// Overwrites the saved amount. Use deposit or withdraw to move money relative to it.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Amount>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl PotUpdates {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Args for updating a pot.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdatePotArgs {
    /// The id of the pot to change.
    #[arg(long)]
    pub id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: PotUpdates,
}

/// The fields of a recurring bill that can be changed. Omitted fields are left alone.
#[derive(Debug, Parser, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BillUpdates {
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// Day of the month, 1 to 31.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<i64>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,

    /// A new logo. An empty string removes the logo.
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl BillUpdates {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Args for updating a recurring bill.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateBillArgs {
    /// The id of the bill to change.
    #[arg(long)]
    pub id: i64,

    #[command(flatten)]
    #[serde(flatten)]
    pub updates: BillUpdates,
}

/// Args for `fintrack deposit` and `fintrack withdraw`.
#[derive(Debug, Parser, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct PotFundsArgs {
    /// The id of the pot.
    #[arg(long)]
    pub id: i64,

    /// How much to move. Must be greater than zero.
    #[arg(long)]
    pub amount: Amount,
}

/// Args for `fintrack ask`.
#[derive(Debug, Parser, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AskArgs {
    /// The question for the advisor, at most 1000 characters.
    pub question: String,

    /// Earlier turns of the conversation, oldest first.
    #[arg(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Turn>,
}

fn default_fintrack_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fintrack"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fintrack-home or FINTRACK_HOME instead of relying on the \
                default fintrack home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("fintrack")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert_expense() {
        let args = Args::try_parse_from([
            "fintrack",
            "--fintrack-home",
            "/tmp/ft",
            "insert",
            "transaction",
            "--name",
            "Savory Bites Bistro",
            "--category",
            "Dining Out",
            "--amount",
            "-55.50",
            "--date",
            "2024-08-19",
        ])
        .unwrap();
        assert_eq!(args.common().fintrack_home().path(), Path::new("/tmp/ft"));
        let Command::Insert(insert) = args.command() else {
            panic!("expected insert, got {:?}", args.command());
        };
        let InsertSubcommand::Transaction(txn) = insert.entity() else {
            panic!("expected a transaction");
        };
        assert!(txn.amount.is_negative());
        assert!(txn.is_recurring.is_none());
    }

    #[test]
    fn test_parse_update_is_partial() {
        let args = Args::try_parse_from([
            "fintrack", "update", "pot", "--id", "3", "--total", "125",
        ])
        .unwrap();
        let Command::Update(update) = args.command() else {
            panic!("expected update");
        };
        let UpdateSubcommand::Pot(pot) = update.entity() else {
            panic!("expected a pot");
        };
        assert_eq!(pot.id, 3);
        assert!(pot.updates.name.is_none());
        assert_eq!(pot.updates.total.unwrap().to_string(), "125.00");
    }

    #[test]
    fn test_entity_aliases() {
        assert_eq!("bills".parse::<Entity>().unwrap(), Entity::Bills);
        assert_eq!("recurring_bills".parse::<Entity>().unwrap(), Entity::Bills);
        let args =
            Args::try_parse_from(["fintrack", "list", "recurring-bills"]).unwrap();
        assert!(matches!(
            args.command(),
            Command::List(ListArgs {
                entity: Entity::Bills
            })
        ));
    }

    #[test]
    fn test_update_args_flatten_in_json() {
        let json = serde_json::json!({"id": 4, "status": "paid", "logo": ""});
        let args: UpdateBillArgs = serde_json::from_value(json).unwrap();
        assert_eq!(args.id, 4);
        assert_eq!(args.updates.status, Some(BillStatus::Paid));
        assert_eq!(args.updates.logo.as_deref(), Some(""));
        assert!(!args.updates.is_empty());
    }

    #[test]
    fn test_ask_history_defaults_to_empty() {
        let args: AskArgs = serde_json::from_str(r#"{"question": "Can I afford a laptop?"}"#)
            .unwrap();
        assert!(args.history.is_empty());
    }
}
