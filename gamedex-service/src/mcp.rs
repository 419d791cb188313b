use axum::{
    Json, Router,
    extract::State,
    response::{Sse, sse::Event},
    routing::get,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::igdb::LookupEndpoint;
use crate::service::GamedexService;

/// MCP server state
pub struct McpState {
    pub service: Arc<GamedexService>,
}

/// Build the MCP router
pub fn mcp_router(service: Arc<GamedexService>) -> Router {
    let state = Arc::new(McpState { service });

    Router::new()
        .route("/", get(mcp_sse_handler))
        .route("/messages", axum::routing::post(mcp_message_handler))
        .with_state(state)
}

const SERVER_INSTRUCTIONS: &str =
    "gamedex MCP server for IGDB game metadata queries and image-to-character identification.";

/// MCP SSE handler - implements the MCP protocol over SSE
async fn mcp_sse_handler(
    State(_state): State<Arc<McpState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("MCP client connected");

    // Send server info as first event
    let server_info = McpServerInfo {
        protocol_version: "2024-11-05".to_string(),
        capabilities: McpCapabilities {
            tools: Some(McpToolsCapability { list_changed: false }),
            resources: None,
            prompts: None,
        },
        server_info: McpImplementation {
            name: "gamedex-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: Some(SERVER_INSTRUCTIONS.to_string()),
    };

    let info_json = serde_json::to_string(&McpMessage::ServerInfo(server_info)).unwrap_or_default();

    let stream = stream::once(async move { Ok::<_, Infallible>(Event::default().data(info_json)) });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// MCP message handler - handles JSON-RPC style requests
async fn mcp_message_handler(
    State(state): State<Arc<McpState>>,
    Json(request): Json<McpRequest>,
) -> Json<McpResponse> {
    debug!(method = %request.method, "MCP request received");

    let result = match request.method.as_str() {
        "initialize" => handle_initialize(&state).await,
        "tools/list" => handle_tools_list(&state).await,
        "tools/call" => handle_tool_call(&state, request.params).await,
        _ => Err(McpError {
            code: -32601,
            message: format!("Method not found: {}", request.method),
        }),
    };

    match result {
        Ok(data) => Json(McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(data),
            error: None,
        }),
        Err(error) => Json(McpResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        }),
    }
}

async fn handle_initialize(_state: &McpState) -> Result<serde_json::Value, McpError> {
    Ok(serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": "gamedex-service",
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": SERVER_INSTRUCTIONS
    }))
}

fn tool_definitions() -> Vec<McpToolDefinition> {
    vec![
        McpToolDefinition {
            name: "game_search".to_string(),
            description: "Search the IGDB database for games by name. Returns id, name, summary, and URL for each match.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the game to search for"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results (default 5)"
                    }
                },
                "required": ["name"]
            }),
        },
        McpToolDefinition {
            name: "game_characters".to_string(),
            description: "Find a game by name and list all of its characters with gender, species, and description.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "game_name": {
                        "type": "string",
                        "description": "Name of the game (e.g. 'Cyberpunk 2077')"
                    }
                },
                "required": ["game_name"]
            }),
        },
        McpToolDefinition {
            name: "character_list".to_string(),
            description: "List characters from the IGDB database without any filter.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of characters (default 10)"
                    }
                }
            }),
        },
        McpToolDefinition {
            name: "lookup_resolve".to_string(),
            description: "Resolve a character gender or species ID into its display name.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "endpoint": {
                        "type": "string",
                        "enum": ["gender", "species"],
                        "description": "Which lookup to resolve against"
                    },
                    "id": {
                        "type": "integer",
                        "description": "The lookup ID to resolve"
                    }
                },
                "required": ["endpoint", "id"]
            }),
        },
        McpToolDefinition {
            name: "character_identify".to_string(),
            description: "Rank a game's characters against an image using the CLIP classifier. Returns the best match and the full ranking.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "game_name": {
                        "type": "string",
                        "description": "Name of the game the character appears in"
                    },
                    "image_base64": {
                        "type": "string",
                        "description": "Base64-encoded image data"
                    }
                },
                "required": ["game_name", "image_base64"]
            }),
        },
    ]
}

async fn handle_tools_list(_state: &McpState) -> Result<serde_json::Value, McpError> {
    Ok(serde_json::json!({ "tools": tool_definitions() }))
}

/// Wrap tool output text in an MCP content payload
fn text_content(text: String) -> serde_json::Value {
    serde_json::json!({
        "content": [{
            "type": "text",
            "text": text
        }]
    })
}

fn tool_error(message: impl std::fmt::Display) -> McpError {
    McpError {
        code: -32000,
        message: message.to_string(),
    }
}

fn invalid_params(message: impl Into<String>) -> McpError {
    McpError {
        code: -32602,
        message: message.into(),
    }
}

/// Pull a schema-required string argument, rejecting absent or empty values
fn required_str<'a>(arguments: &'a serde_json::Value, key: &str) -> Result<&'a str, McpError> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid_params(format!("Missing required argument: {}", key)))
}

async fn handle_tool_call(
    state: &McpState,
    params: Option<serde_json::Value>,
) -> Result<serde_json::Value, McpError> {
    let params = params.ok_or_else(|| invalid_params("Missing params"))?;

    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid_params("Missing tool name"))?;

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    let result = match name {
        "game_search" => {
            let game_name = required_str(&arguments, "name")?;
            let limit = arguments.get("limit").and_then(|v| v.as_u64()).unwrap_or(5) as u32;

            match state.service.game_search_report(game_name, limit).await {
                Ok(text) => text_content(text),
                Err(e) => return Err(tool_error(e)),
            }
        }
        "game_characters" => {
            let game_name = required_str(&arguments, "game_name")?;

            match state.service.game_characters_report(game_name).await {
                Ok(text) => text_content(text),
                Err(e) => return Err(tool_error(e)),
            }
        }
        "character_list" => {
            let limit = arguments
                .get("limit")
                .and_then(|v| v.as_u64())
                .map(|v| v as u32);

            match state.service.character_list_report(limit).await {
                Ok(text) => text_content(text),
                Err(e) => return Err(tool_error(e)),
            }
        }
        "lookup_resolve" => {
            let endpoint = required_str(&arguments, "endpoint")?
                .parse::<LookupEndpoint>()
                .map_err(|e| invalid_params(e.to_string()))?;
            let id = arguments
                .get("id")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| invalid_params("Missing required argument: id"))?;

            match state.service.resolve_lookup(endpoint, id).await {
                Ok(lookup_name) => text_content(lookup_name),
                Err(e) => return Err(tool_error(e)),
            }
        }
        "character_identify" => {
            let game_name = required_str(&arguments, "game_name")?;
            let image_base64 = required_str(&arguments, "image_base64")?;

            let image = BASE64
                .decode(image_base64)
                .map_err(|e| invalid_params(format!("Invalid image_base64: {}", e)))?;

            match state.service.identify_character(game_name, &image).await {
                Ok(text) => text_content(text),
                Err(e) => return Err(tool_error(e)),
            }
        }
        _ => {
            return Err(McpError {
                code: -32601,
                message: format!("Unknown tool: {}", name),
            });
        }
    };

    Ok(result)
}

// MCP Protocol Types

#[derive(Debug, Serialize, Deserialize)]
struct McpRequest {
    jsonrpc: String,
    id: serde_json::Value,
    method: String,
    #[serde(default)]
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct McpResponse {
    jsonrpc: String,
    id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<McpError>,
}

#[derive(Debug, Serialize)]
struct McpError {
    code: i32,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum McpMessage {
    ServerInfo(McpServerInfo),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpServerInfo {
    protocol_version: String,
    capabilities: McpCapabilities,
    server_info: McpImplementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
}

#[derive(Debug, Serialize)]
struct McpCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<McpToolsCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompts: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpToolsCapability {
    list_changed: bool,
}

#[derive(Debug, Serialize)]
struct McpImplementation {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpToolDefinition {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_are_complete() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "game_search",
                "game_characters",
                "character_list",
                "lookup_resolve",
                "character_identify",
            ]
        );

        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object");
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_tool_definition_serialization_uses_camel_case() {
        let tools = tool_definitions();
        let value = serde_json::to_value(&tools[0]).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn test_text_content_shape() {
        let value = text_content("hello".to_string());
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "hello");
    }

    fn test_state() -> McpState {
        let static_config = serde_json::from_value(serde_json::json!({})).unwrap();
        let dynamic = serde_json::from_value(serde_json::json!({})).unwrap();
        let runtime = crate::config::RuntimeConfig::from_parts(static_config, dynamic);
        McpState {
            service: Arc::new(GamedexService::new(Arc::new(runtime))),
        }
    }

    #[test]
    fn test_game_search_without_name_is_invalid_params() {
        let state = test_state();
        let params = serde_json::json!({ "name": "game_search", "arguments": {} });

        let result = tokio_test::block_on(handle_tool_call(&state, Some(params)));
        assert_eq!(result.unwrap_err().code, -32602);
    }

    #[test]
    fn test_lookup_resolve_without_id_is_invalid_params() {
        let state = test_state();
        let params = serde_json::json!({
            "name": "lookup_resolve",
            "arguments": { "endpoint": "gender" }
        });

        let result = tokio_test::block_on(handle_tool_call(&state, Some(params)));
        assert_eq!(result.unwrap_err().code, -32602);
    }

    #[test]
    fn test_character_identify_without_image_is_invalid_params() {
        let state = test_state();
        let params = serde_json::json!({
            "name": "character_identify",
            "arguments": { "game_name": "Cyberpunk 2077" }
        });

        let result = tokio_test::block_on(handle_tool_call(&state, Some(params)));
        assert_eq!(result.unwrap_err().code, -32602);
    }

    #[test]
    fn test_request_parsing_without_params() {
        let request: McpRequest = serde_json::from_str(
            r#"{"jsonrpc": "2.0", "id": 1, "method": "tools/list"}"#,
        )
        .unwrap();
        assert_eq!(request.method, "tools/list");
        assert!(request.params.is_none());
    }
}
