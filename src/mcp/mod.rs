//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides an MCP server that exposes the fintrack commands as tools for AI agent
//! integration. The server communicates via JSON-RPC over stdio.

mod mcp_utils;
mod tools;

use crate::{Config, Mode};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;
use rmcp::{tool_handler, ServerHandler, ServiceExt};
use std::sync::Arc;
use tracing::info;

/// The fintrack MCP server.
#[derive(Debug, Clone)]
pub struct FintrackServer {
    mode: Mode,
    config: Arc<Config>,
    tool_router: ToolRouter<FintrackServer>,
}

impl FintrackServer {
    /// Creates a new FintrackServer with the given configuration.
    pub fn new(config: Config, mode: Mode) -> Self {
        Self {
            mode,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    fn config(&self) -> Config {
        (*self.config).clone()
    }
}

#[tool_handler]
impl ServerHandler for FintrackServer {
    /// Returns server information sent to the MCP client during initialization. The
    /// `instructions` field tells the agent what the data means and how the tools fit together.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fintrack".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(include_str!("docs/INTRO.md").into()),
        }
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Default)]
pub(crate) enum Io {
    #[default]
    Stdio,
    /// Mock transport for testing - holds one end of a duplex channel.
    #[cfg(test)]
    Mock(tokio::io::DuplexStream),
}

/// Runs the MCP server with stdio transport or mock transport. This function starts the MCP server
/// and blocks until the client disconnects or an error occurs.
///
/// # Arguments
/// - `config`: The `Config` object
/// - `mode`: Whether the advisor calls Google or answers offline
/// - `io`: Whether we are using stdio as the transport or using mock io for testing
pub(crate) async fn run_server(config: Config, mode: Mode, io: Io) -> crate::Result<()> {
    use crate::error::{ErrorType, IntoResult};
    let server = FintrackServer::new(config, mode);
    info!("Starting MCP server...");

    let service = match io {
        Io::Stdio => server
            .serve(stdio())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
        #[cfg(test)]
        Io::Mock(stream) => server
            .serve(stream)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start MCP server: {e}"))
            .pub_result(ErrorType::Service)?,
    };

    info!("MCP server running, waiting for requests...");

    service
        .waiting()
        .await
        .map_err(|e| anyhow::anyhow!("MCP server error: {e}"))
        .pub_result(ErrorType::Service)?;

    info!("MCP server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use rmcp::model::{CallToolRequestParam, CallToolResult, RawContent};
    use rmcp::service::{RoleClient, RunningService};
    use serde_json::{json, Value};
    use tokio::io::duplex;

    type Client = RunningService<RoleClient, ()>;

    async fn call(client: &Client, name: &str, arguments: Value) -> CallToolResult {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            _ => None,
        };
        client
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await
            .unwrap_or_else(|e| panic!("{name} call failed: {e}"))
    }

    fn text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.clone(),
            other => panic!("expected text content, got {other:?}"),
        }
    }

    /// The structured output of a successful call, which is sent as a second, JSON-encoded text
    /// item.
    fn structure(result: &CallToolResult) -> Value {
        match &result.content[1].raw {
            RawContent::Text(t) => serde_json::from_str(&t.text).unwrap(),
            other => panic!("expected JSON content, got {other:?}"),
        }
    }

    fn assert_ok(name: &str, result: &CallToolResult) {
        assert!(
            !result.is_error.unwrap_or(false),
            "{name} returned error: {:?}",
            result.content
        );
    }

    /// Integration test for the MCP server using an in-memory transport.
    #[tokio::test]
    async fn test_mcp_server_integration() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        let server_handle =
            tokio::spawn(
                async move { run_server(config, Mode::Testing, Io::Mock(server_io)).await },
            );
        let client = ().serve(client_io).await.expect("Failed to create client");

        let tools = client.list_all_tools().await.unwrap();
        let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
        for expected in ["list_transactions", "insert_pot", "deposit_to_pot", "ask_advisor"] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }

        let result = call(
            &client,
            "insert_transaction",
            json!({"name": "Salary", "category": "General", "amount": "3,500.00", "date": "2024-08-01"}),
        )
        .await;
        assert_ok("insert_transaction", &result);
        assert_eq!(structure(&result)["is_income"], true);

        let result = call(
            &client,
            "insert_pot",
            json!({"name": "Holiday", "target": 100}),
        )
        .await;
        assert_ok("insert_pot", &result);
        let pot_id = structure(&result)["id"].as_i64().unwrap();

        let result = call(
            &client,
            "deposit_to_pot",
            json!({"id": pot_id, "amount": 40}),
        )
        .await;
        assert_ok("deposit_to_pot", &result);
        assert_eq!(structure(&result)["percentage"], 40.0);

        let result = call(
            &client,
            "update_pot",
            json!({"id": pot_id, "name": "Summer holiday"}),
        )
        .await;
        assert_ok("update_pot", &result);
        assert_eq!(structure(&result)["name"], "Summer holiday");

        let result = call(&client, "summary", json!({})).await;
        assert_ok("summary", &result);
        assert_eq!(structure(&result)["pots_total"], 40.0);

        let result = call(
            &client,
            "ask_advisor",
            json!({"question": "Am I rich yet?"}),
        )
        .await;
        assert_ok("ask_advisor", &result);
        assert_eq!(text(&result), "[test mode] 1 turn(s). Question: Am I rich yet?");

        let result = call(
            &client,
            "delete_record",
            json!({"entity": "pots", "id": pot_id}),
        )
        .await;
        assert_ok("delete_record", &result);

        let result = call(&client, "get_pot", json!({"id": pot_id})).await;
        assert!(result.is_error.unwrap_or(false));
        assert_eq!(text(&result), format!("Pot {pot_id} was not found"));

        drop(client);
        let server_result = tokio::time::timeout(std::time::Duration::from_secs(5), server_handle)
            .await
            .expect("Server did not shut down in time")
            .expect("Server task panicked");
        assert!(server_result.is_ok(), "Server returned error: {server_result:?}");
    }

    #[tokio::test]
    async fn test_validation_errors_are_tool_errors() {
        let (client_io, server_io) = duplex(4096);
        let env = TestEnv::new().await;
        let config = env.config();
        tokio::spawn(async move { run_server(config, Mode::Testing, Io::Mock(server_io)).await });
        let client = ().serve(client_io).await.unwrap();

        let result = call(
            &client,
            "insert_bill",
            json!({"name": "Gym", "amount": 30, "due_day": 40, "status": "upcoming"}),
        )
        .await;
        assert!(result.is_error.unwrap_or(false));
        assert!(text(&result).contains("due_day"));
    }
}
