//! The MCP tools. Each tool calls the command of the same name and returns its `Out`.

use crate::args::{
    AskArgs, EntityIdArgs, IdArgs, InsertBillArgs, InsertBudgetArgs, InsertPotArgs,
    InsertTransactionArgs, PotFundsArgs, UpdateBillArgs, UpdateBudgetArgs, UpdatePotArgs,
    UpdateTransactionArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::FintrackServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl FintrackServer {
    /// List all transactions, newest first. Positive amounts are income and negative amounts are
    /// expenses.
    #[tool]
    async fn list_transactions(&self) -> Result<CallToolResult, McpError> {
        tool_result(commands::list_transactions(self.config()).await)
    }

    /// List all budgets. Each budget includes `current`, the amount spent so far in its category,
    /// and `remaining`.
    #[tool]
    async fn list_budgets(&self) -> Result<CallToolResult, McpError> {
        tool_result(commands::list_budgets(self.config()).await)
    }

    /// List all savings pots with their progress `percentage` towards the target.
    #[tool]
    async fn list_pots(&self) -> Result<CallToolResult, McpError> {
        tool_result(commands::list_pots(self.config()).await)
    }

    /// List all recurring bills, ordered by due day.
    #[tool]
    async fn list_bills(&self) -> Result<CallToolResult, McpError> {
        tool_result(commands::list_bills(self.config()).await)
    }

    #[tool]
    /// Get one transaction by id.
    async fn get_transaction(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::get_transaction(self.config(), args).await)
    }

    #[tool]
    /// Get one budget by id, including how much has been spent.
    async fn get_budget(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::get_budget(self.config(), args).await)
    }

    #[tool]
    /// Get one savings pot by id.
    async fn get_pot(&self, Parameters(args): Parameters<IdArgs>) -> Result<CallToolResult, McpError> {
        tool_result(commands::get_pot(self.config(), args).await)
    }

    #[tool]
    /// Get one recurring bill by id.
    async fn get_bill(
        &self,
        Parameters(args): Parameters<IdArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::get_bill(self.config(), args).await)
    }

    /// Record a transaction. Use a negative amount for an expense and a positive amount for
    /// income. The date is YYYY-MM-DD.
    #[tool]
    async fn insert_transaction(
        &self,
        Parameters(args): Parameters<InsertTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: insert_transaction called for '{}'", args.name);
        tool_result(commands::insert_transaction(self.config(), args).await)
    }

    /// Create a budget, i.e. a spending limit for one transaction category.
    #[tool]
    async fn insert_budget(
        &self,
        Parameters(args): Parameters<InsertBudgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::insert_budget(self.config(), args).await)
    }

    /// Create an empty savings pot with a target amount.
    #[tool]
    async fn insert_pot(
        &self,
        Parameters(args): Parameters<InsertPotArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::insert_pot(self.config(), args).await)
    }

    /// Create a recurring bill. `due_day` is the day of the month (1 to 31) and `status` is
    /// either `paid` or `upcoming`.
    #[tool]
    async fn insert_bill(
        &self,
        Parameters(args): Parameters<InsertBillArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::insert_bill(self.config(), args).await)
    }

    /// Change some fields of a transaction. Fields that are left out keep their value. At least
    /// one field must be given.
    #[tool]
    async fn update_transaction(
        &self,
        Parameters(args): Parameters<UpdateTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::update_transaction(self.config(), args).await)
    }

    /// Change some fields of a budget. At least one field must be given.
    #[tool]
    async fn update_budget(
        &self,
        Parameters(args): Parameters<UpdateBudgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::update_budget(self.config(), args).await)
    }

    /// Change some fields of a savings pot. Setting `total` overwrites the saved amount; prefer
    /// `deposit_to_pot` and `withdraw_from_pot` to move money.
    #[tool]
    async fn update_pot(
        &self,
        Parameters(args): Parameters<UpdatePotArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::update_pot(self.config(), args).await)
    }

    /// Change some fields of a recurring bill, e.g. mark it as paid. An empty `logo` removes the
    /// logo.
    #[tool]
    async fn update_bill(
        &self,
        Parameters(args): Parameters<UpdateBillArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::update_bill(self.config(), args).await)
    }

    /// Delete one record. `entity` is one of transactions, budgets, pots or bills.
    #[tool]
    async fn delete_record(
        &self,
        Parameters(args): Parameters<EntityIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: delete_record called for {} {}", args.entity, args.id);
        tool_result(commands::delete(self.config(), args).await)
    }

    /// Add money to a savings pot. The amount must be greater than zero.
    #[tool]
    async fn deposit_to_pot(
        &self,
        Parameters(args): Parameters<PotFundsArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::deposit(self.config(), args).await)
    }

    /// Take money out of a savings pot. Withdrawing more than the pot holds empties it.
    #[tool]
    async fn withdraw_from_pot(
        &self,
        Parameters(args): Parameters<PotFundsArgs>,
    ) -> Result<CallToolResult, McpError> {
        tool_result(commands::withdraw(self.config(), args).await)
    }

    /// Balance, income and expenses, budget totals, bill totals and the total saved in pots.
    #[tool]
    async fn summary(&self) -> Result<CallToolResult, McpError> {
        tool_result(commands::summary(self.config()).await)
    }

    /// Ask the financial advisor a question. The advisor sees a summary of all stored records.
    /// Pass earlier turns of the conversation in `history`, oldest first.
    #[tool]
    async fn ask_advisor(
        &self,
        Parameters(args): Parameters<AskArgs>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: ask_advisor called");
        tool_result(commands::ask(self.config(), self.mode, args).await)
    }
}
