use crate::prelude::{eprintln, println, *};
use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use jiratool_core::jira::{
    format_comments_markdown, format_dev_info_markdown, format_projects_markdown,
    format_search_markdown, format_statuses_markdown, format_ticket_markdown,
};

#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Model Context Protocol server")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Start MCP server with stdio transport
    #[clap(name = "stdio")]
    Stdio,

    /// Start MCP server with SSE transport (HTTP)
    #[clap(name = "sse")]
    Sse(SseOptions),
}

#[derive(Debug, clap::Args)]
pub struct SseOptions {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

// MCP Protocol types
#[derive(Debug, Serialize)]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
struct ToolsCapability {}

#[derive(Debug, Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolsList {
    tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CallToolResult {
    content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Stdio => run_stdio(global).await,
        Commands::Sse(options) => run_sse(options, global).await,
    }
}

async fn run_stdio(global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Starting MCP server with stdio transport...");
        eprintln!();
    }

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if global.verbose {
            eprintln!("Received: {trimmed}");
        }

        let response = handle_request(trimmed, &global).await;
        let response_json = serde_json::to_string(&response)?;

        if global.verbose {
            eprintln!("Sending: {response_json}");
        }

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn handle_request(request_str: &str, global: &crate::Global) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError {
                    code: -32700,
                    message: format!("Parse error: {e}"),
                    data: None,
                }),
            };
        }
    };

    let result = match request.method.as_str() {
        "initialize" => handle_initialize(),
        "tools/list" => handle_tools_list(),
        "tools/call" => handle_tools_call(request.params, global).await,
        method => Err(JsonRpcError {
            code: -32601,
            message: format!("Method not found: {method}"),
            data: None,
        }),
    };

    match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    }
}

fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "jiratool".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = vec![
        Tool {
            name: "jira_search".to_string(),
            description: "Search Jira issues using a JQL query. Returns a Markdown table of matching issues with pagination info.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "JQL query (e.g., 'project = PROJ AND status = Open')"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Number of issues per page (default: 10, max: 100)"
                    },
                    "start_at": {
                        "type": "number",
                        "description": "Offset of the first result (default: 0)"
                    }
                },
                "required": ["jql"]
            }),
        },
        Tool {
            name: "jira_get_issue".to_string(),
            description: "Get a Jira issue with its description and comments rendered as Markdown.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key (e.g., 'PROJ-123')"
                    }
                },
                "required": ["issue_key"]
            }),
        },
        Tool {
            name: "jira_get_comments".to_string(),
            description: "List the comments on a Jira issue as Markdown, one page at a time.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key (e.g., 'PROJ-123')"
                    },
                    "limit": {
                        "type": "number",
                        "description": "Number of comments per page (default: 10, max: 100)"
                    },
                    "start_at": {
                        "type": "number",
                        "description": "Offset of the first comment (default: 0)"
                    }
                },
                "required": ["issue_key"]
            }),
        },
        Tool {
            name: "jira_add_comment".to_string(),
            description: "Add a comment to a Jira issue. The body is Markdown and is converted to Jira's rich-text format; set markdown to false to post plain text.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key (e.g., 'PROJ-123')"
                    },
                    "body": {
                        "type": "string",
                        "description": "Comment body"
                    },
                    "markdown": {
                        "type": "boolean",
                        "description": "Interpret the body as Markdown (default: true)"
                    }
                },
                "required": ["issue_key", "body"]
            }),
        },
        Tool {
            name: "jira_list_projects".to_string(),
            description: "List Jira projects visible to the authenticated user as a Markdown table.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Number of projects per page (default: 25, max: 100)"
                    },
                    "start_at": {
                        "type": "number",
                        "description": "Offset of the first project (default: 0)"
                    }
                }
            }),
        },
        Tool {
            name: "jira_list_statuses".to_string(),
            description: "List the workflow statuses configured on the Jira instance.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "jira_get_development_info".to_string(),
            description: "Show the branches, commits and pull requests linked to a Jira issue.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "issue_key": {
                        "type": "string",
                        "description": "Issue key (e.g., 'PROJ-123')"
                    }
                },
                "required": ["issue_key"]
            }),
        },
    ];

    let result = ToolsList { tools };

    serde_json::to_value(result).map_err(internal_error)
}

async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError {
            code: -32602,
            message: format!("Invalid params: {e}"),
            data: None,
        })?;

    if global.verbose {
        eprintln!("Calling tool: {}", params.name);
    }

    let arguments = params.arguments.unwrap_or(serde_json::Value::Null);

    let outcome = match params.name.as_str() {
        "jira_search" => tool_search(arguments).await?,
        "jira_get_issue" => tool_get_issue(arguments).await?,
        "jira_get_comments" => tool_get_comments(arguments).await?,
        "jira_add_comment" => tool_add_comment(arguments).await?,
        "jira_list_projects" => tool_list_projects(arguments).await?,
        "jira_list_statuses" => tool_list_statuses().await,
        "jira_get_development_info" => tool_get_development_info(arguments).await?,
        _ => {
            return Err(JsonRpcError {
                code: -32602,
                message: format!("Unknown tool: {}", params.name),
                data: None,
            });
        }
    };

    // A failed fetch is still a well-formed tool result: the calling agent
    // gets a readable message instead of a protocol fault.
    let result = match outcome {
        Ok(text) => CallToolResult {
            content: vec![Content::Text { text }],
            is_error: None,
        },
        Err(e) => CallToolResult {
            content: vec![Content::Text {
                text: format!("Error: {}", e.user_message()),
            }],
            is_error: Some(true),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    arguments: serde_json::Value,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(arguments).map_err(|e| JsonRpcError {
        code: -32602,
        message: format!("Invalid arguments: {e}"),
        data: None,
    })
}

fn internal_error(e: serde_json::Error) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    }
}

async fn tool_search(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        jql: String,
        limit: Option<usize>,
        start_at: Option<u64>,
    }

    let args: Args = parse_arguments(arguments)?;

    Ok(
        crate::jira::search_issues_data(args.jql, args.limit.unwrap_or(10), args.start_at)
            .await
            .map(|data| format_search_markdown(&data)),
    )
}

async fn tool_get_issue(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
    }

    let args: Args = parse_arguments(arguments)?;

    Ok(crate::jira::get_ticket_data(args.issue_key)
        .await
        .map(|ticket| format_ticket_markdown(&ticket)))
}

async fn tool_get_comments(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        limit: Option<usize>,
        start_at: Option<u64>,
    }

    let args: Args = parse_arguments(arguments)?;
    let issue_key = args.issue_key.clone();

    Ok(
        crate::jira::list_comments_data(args.issue_key, args.limit.unwrap_or(10), args.start_at)
            .await
            .map(|data| format_comments_markdown(&issue_key, &data)),
    )
}

async fn tool_add_comment(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
        body: String,
        markdown: Option<bool>,
    }

    let args: Args = parse_arguments(arguments)?;
    let issue_key = args.issue_key.clone();
    let plain = !args.markdown.unwrap_or(true);

    Ok(
        crate::jira::add_comment_data(args.issue_key, args.body, plain)
            .await
            .map(|comment| format!("Comment {} added to {}.", comment.id, issue_key)),
    )
}

async fn tool_list_projects(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize, Default)]
    struct Args {
        limit: Option<usize>,
        start_at: Option<u64>,
    }

    let args: Args = match arguments {
        serde_json::Value::Null => Args::default(),
        other => parse_arguments(other)?,
    };

    Ok(
        crate::jira::list_projects_data(args.limit.unwrap_or(25), args.start_at)
            .await
            .map(|data| format_projects_markdown(&data)),
    )
}

async fn tool_list_statuses() -> Result<String, JiraError> {
    crate::jira::list_statuses_data()
        .await
        .map(|statuses| format_statuses_markdown(&statuses))
}

async fn tool_get_development_info(
    arguments: serde_json::Value,
) -> Result<Result<String, JiraError>, JsonRpcError> {
    #[derive(Deserialize)]
    struct Args {
        issue_key: String,
    }

    let args: Args = parse_arguments(arguments)?;
    let issue_key = args.issue_key.clone();

    Ok(crate::jira::get_dev_info_data(args.issue_key)
        .await
        .map(|info| format_dev_info_markdown(&issue_key, &info)))
}

async fn run_sse(options: SseOptions, global: crate::Global) -> Result<()> {
    use axum::{
        routing::{get, post},
        Router,
    };
    use tower_http::cors::{Any, CorsLayer};

    if global.verbose {
        eprintln!(
            "Starting MCP server with SSE transport on {}:{}...",
            options.host, options.port
        );
    }

    let addr = format!("{}:{}", options.host, options.port);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let shared_global = Arc::new(global.clone());

    let app_router = Router::new()
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .layer(cors)
        .with_state(shared_global);

    if global.verbose {
        eprintln!("MCP server listening on http://{}", addr);
        eprintln!("SSE endpoint: http://{}/sse", addr);
        eprintln!("Message endpoint: http://{}/message", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

async fn sse_handler(
    State(_global): State<Arc<crate::Global>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = stream::once(async { Ok(Event::default().data("MCP SSE endpoint ready")) });
    Sse::new(stream)
}

async fn message_handler(
    State(global): State<Arc<crate::Global>>,
    Json(request): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let request_str = serde_json::to_string(&request).unwrap_or_default();
    let response = handle_request(&request_str, &global).await;
    Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_global() -> crate::Global {
        crate::Global { verbose: false }
    }

    #[test]
    fn test_initialize_advertises_tools_capability() {
        let result = handle_initialize().unwrap();

        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "jiratool");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_tools_list_names_every_jira_tool() {
        let result = handle_tools_list().unwrap();
        let tools = result["tools"].as_array().unwrap();

        let names: Vec<&str> = tools
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "jira_search",
                "jira_get_issue",
                "jira_get_comments",
                "jira_add_comment",
                "jira_list_projects",
                "jira_list_statuses",
                "jira_get_development_info",
            ]
        );
    }

    #[test]
    fn test_tools_list_schemas_declare_required_fields() {
        let result = handle_tools_list().unwrap();
        let tools = result["tools"].as_array().unwrap();

        let search = tools.iter().find(|t| t["name"] == "jira_search").unwrap();
        assert_eq!(search["inputSchema"]["required"][0], "jql");

        let comment = tools
            .iter()
            .find(|t| t["name"] == "jira_add_comment")
            .unwrap();
        let required = comment["inputSchema"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_request_is_a_parse_error() {
        let response = handle_request("{not json", &test_global()).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32700);
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_method_is_method_not_found() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#;

        let response = handle_request(request, &test_global()).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("resources/list"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let request = r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"jira_explode"}}"#;

        let response = handle_request(request, &test_global()).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("jira_explode"));
    }

    #[tokio::test]
    async fn test_tool_failure_rides_inside_a_result_envelope() {
        // With no credentials in the environment the data layer fails, but
        // the response must still be a well-formed tool result.
        std::env::remove_var("JIRA_BASE_URL");
        let request = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"jira_search","arguments":{"jql":"project = X"}}}"#;

        let response = handle_request(request, &test_global()).await;

        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error:"));
    }
}
