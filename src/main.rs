use clap::Parser;
use fintrack::args::{Args, Command, Entity, IdArgs, InsertSubcommand, UpdateSubcommand};
use fintrack::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fintrack_home().path();

    // When FINTRACK_IN_TEST_MODE is set and non-empty the advisor answers locally instead of
    // calling Gemini.
    let mode = Mode::from_env();

    match args.command() {
        Command::Init(init_args) => commands::init(home, init_args.clone()).await?.print(),
        command => run(Config::load(home).await?, mode, command).await?,
    }
    Ok(())
}

/// Runs every command that needs an initialized home directory.
async fn run(config: Config, mode: Mode, command: &Command) -> Result<()> {
    let _: () = match command {
        Command::Init(_) => {}

        Command::Serve(serve_args) => commands::serve(config, mode, serve_args.clone())
            .await?
            .print(),

        Command::Mcp(mcp_args) => commands::mcp(config, mode, mcp_args.clone())
            .await?
            .print(),

        Command::List(list_args) => match list_args.entity {
            Entity::Transactions => commands::list_transactions(config).await?.print(),
            Entity::Budgets => commands::list_budgets(config).await?.print(),
            Entity::Pots => commands::list_pots(config).await?.print(),
            Entity::Bills => commands::list_bills(config).await?.print(),
        },

        Command::Get(get_args) => {
            let id = IdArgs { id: get_args.id };
            match get_args.entity {
                Entity::Transactions => commands::get_transaction(config, id).await?.print(),
                Entity::Budgets => commands::get_budget(config, id).await?.print(),
                Entity::Pots => commands::get_pot(config, id).await?.print(),
                Entity::Bills => commands::get_bill(config, id).await?.print(),
            }
        }

        Command::Insert(insert_args) => match insert_args.entity() {
            InsertSubcommand::Transaction(args) => {
                commands::insert_transaction(config, args.clone())
                    .await?
                    .print()
            }
            InsertSubcommand::Budget(args) => commands::insert_budget(config, args.clone())
                .await?
                .print(),
            InsertSubcommand::Pot(args) => {
                commands::insert_pot(config, args.clone()).await?.print()
            }
            InsertSubcommand::Bill(args) => {
                commands::insert_bill(config, args.clone()).await?.print()
            }
        },

        Command::Update(update_args) => match update_args.entity() {
            UpdateSubcommand::Transaction(args) => {
                commands::update_transaction(config, args.clone())
                    .await?
                    .print()
            }
            UpdateSubcommand::Budget(args) => commands::update_budget(config, args.clone())
                .await?
                .print(),
            UpdateSubcommand::Pot(args) => {
                commands::update_pot(config, args.clone()).await?.print()
            }
            UpdateSubcommand::Bill(args) => {
                commands::update_bill(config, args.clone()).await?.print()
            }
        },

        Command::Delete(delete_args) => {
            commands::delete(config, delete_args.clone()).await?.print()
        }

        Command::Deposit(funds) => commands::deposit(config, *funds).await?.print(),

        Command::Withdraw(funds) => commands::withdraw(config, *funds).await?.print(),

        Command::Summary => commands::summary(config).await?.print(),

        Command::Ask(ask_args) => commands::ask(config, mode, ask_args.clone())
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => {
            // This crate and the HTTP request traces log at the requested level by default.
            EnvFilter::new(default_directives(level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_directives(level: LevelFilter) -> String {
    format!(
        "{}={level},{}={level},tower_http={level}",
        env!("CARGO_CRATE_NAME"),
        env!("CARGO_BIN_NAME"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_include_request_traces() {
        let directives = default_directives(LevelFilter::DEBUG);
        assert_eq!(directives, "fintrack=debug,fintrack=debug,tower_http=debug");
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
