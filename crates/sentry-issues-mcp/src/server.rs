//! MCP server implementation.
//!
//! The server handles the MCP protocol lifecycle:
//! 1. Initialize - exchange capabilities
//! 2. Serve requests - tool calls and resource reads run concurrently,
//!    everything else is answered as it arrives
//! 3. Shutdown - on end of input or interrupt, close the transport

use std::future::Future;
use std::io;
use std::sync::Arc;

use sentry_issues_core::IssueTracker;
use serde_json::Value;
use tokio::task::JoinSet;

use crate::handlers::ToolHandler;
use crate::protocol::{
    InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
    ResourceReadParams, ResourcesCapability, ResourcesListResult, ServerCapabilities, ServerInfo,
    ToolCallParams, ToolsCapability, ToolsListResult, MCP_VERSION,
};
use crate::transport::{IncomingMessage, StdioTransport};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "mcp-sentry-issue-server";

/// MCP server exposing one issue tracker.
pub struct McpServer {
    handler: ToolHandler,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server.
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self {
            handler: ToolHandler::new(tracker),
            initialized: false,
        }
    }

    /// Serve on stdin/stdout until EOF or interrupt.
    pub async fn run(&mut self) -> io::Result<()> {
        let transport = StdioTransport::stdio()?;
        self.run_until(transport, interrupted()).await
    }

    /// Serve on the given transport until EOF or until `shutdown` completes.
    ///
    /// Responses are written in completion order. After EOF the requests
    /// still in flight are answered before returning; on shutdown they are
    /// dropped unanswered.
    pub async fn run_until<F>(&mut self, mut transport: StdioTransport, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Starting MCP server");

        tokio::pin!(shutdown);
        let mut in_flight: JoinSet<JsonRpcResponse> = JoinSet::new();
        let mut reading = true;

        let outcome = loop {
            if !reading && in_flight.is_empty() {
                break Ok(());
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(pending = in_flight.len(), "Shutting down");
                    break Ok(());
                }
                Some(joined) = in_flight.join_next() => match joined {
                    Ok(resp) => {
                        if let Err(e) = transport.write_response(&resp).await {
                            break Err(e);
                        }
                    }
                    Err(e) => tracing::error!("Request task failed: {}", e),
                },
                message = transport.read_message(), if reading => match message {
                    Ok(Some(IncomingMessage::Request(req))) => {
                        if let Some(resp) = self.dispatch(req, &mut in_flight) {
                            if let Err(e) = transport.write_response(&resp).await {
                                break Err(e);
                            }
                        }
                    }
                    Ok(Some(IncomingMessage::Notification(notif))) => {
                        self.handle_notification(&notif.method);
                    }
                    Ok(None) => {
                        tracing::info!(pending = in_flight.len(), "EOF received");
                        reading = false;
                    }
                    Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                        let error_resp = JsonRpcResponse::error(
                            RequestId::Null,
                            JsonRpcError::parse_error(&e.to_string()),
                        );
                        if let Err(e) = transport.write_response(&error_resp).await {
                            break Err(e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Transport error: {}", e);
                        reading = false;
                    }
                },
            }
        };

        in_flight.abort_all();

        if let Err(e) = transport.close().await {
            tracing::warn!("Failed to close transport: {}", e);
        }

        tracing::info!("MCP server stopped");
        outcome
    }

    /// Answer a request inline, or start it on `in_flight` if it needs the tracker.
    fn dispatch(
        &mut self,
        req: JsonRpcRequest,
        in_flight: &mut JoinSet<JsonRpcResponse>,
    ) -> Option<JsonRpcResponse> {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        let method = req.method.clone();
        let response = match method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::from_result(
                req.id,
                &ToolsListResult {
                    tools: self.handler.available_tools(),
                },
            ),
            "resources/list" => JsonRpcResponse::from_result(
                req.id,
                &ResourcesListResult {
                    resources: self.handler.available_resources(),
                },
            ),
            "tools/call" => {
                let handler = self.handler.clone();
                in_flight.spawn(async move { call_tool(&handler, req.id, req.params).await });
                return None;
            }
            "resources/read" => {
                let handler = self.handler.clone();
                in_flight.spawn(async move { read_resource(&handler, req.id, req.params).await });
                return None;
            }
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                tracing::info!("Client initialized");
            }
            "notifications/cancelled" => {
                tracing::debug!("Request cancelled by client");
            }
            _ => {
                tracing::debug!("Ignoring notification: {}", method);
            }
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init_params) => {
                    tracing::info!(
                        "Client: {} v{} (protocol: {})",
                        init_params.client_info.name,
                        init_params.client_info.version,
                        init_params.protocol_version
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to parse initialize params: {}", e);
                }
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }
}

async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Interrupt received"),
        Err(e) => {
            tracing::warn!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await
        }
    }
}

async fn call_tool(handler: &ToolHandler, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
    let params: ToolCallParams = match parse_params(params) {
        Ok(params) => params,
        Err(e) => return JsonRpcResponse::error(id, e),
    };

    tracing::info!("Calling tool: {}", params.name);

    match handler.execute(&params.name, params.arguments).await {
        Ok(result) => JsonRpcResponse::from_result(id, &result),
        Err(e) => JsonRpcResponse::error(id, e),
    }
}

async fn read_resource(
    handler: &ToolHandler,
    id: RequestId,
    params: Option<Value>,
) -> JsonRpcResponse {
    let params: ResourceReadParams = match parse_params(params) {
        Ok(params) => params,
        Err(e) => return JsonRpcResponse::error(id, e),
    };

    tracing::info!("Reading resource: {}", params.uri);

    match handler.read_resource(&params.uri).await {
        Ok(result) => JsonRpcResponse::from_result(id, &result),
        Err(e) => JsonRpcResponse::error(id, e),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(&e.to_string()))
}
