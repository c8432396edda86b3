use crate::args::InitArgs;
use crate::commands::Out;
use crate::db::SeedCounts;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, `config.json` and an empty database. With `--seed` the database
/// is filled with demo records and the counts are returned.
///
/// # Errors
/// - Returns an error if any file operations fail or if the directory was already initialized.
pub async fn init(fintrack_home: &Path, args: InitArgs) -> Result<Out<SeedCounts>> {
    let config = Config::create(fintrack_home).await?;
    let home = config.root().display().to_string();
    if !args.seed {
        return Ok(format!("Created the fintrack home at {home}").into());
    }
    let counts = config
        .db()
        .seed_demo_data()
        .await
        .context("Unable to insert the demo data")
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Created the fintrack home at {home} with {} demo transactions, {} budgets, {} pots and \
        {} bills",
        counts.transactions, counts.budgets, counts.pots, counts.bills
    );
    Ok(Out::new(message, counts))
}
