use anyhow::Context as _;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::transport::streamable_http_client::{
    StreamableHttpClient as _, StreamableHttpPostResponse,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal MCP client over rmcp's streamable HTTP client plumbing (SSE parsing and the
/// session header).
pub struct McpSession {
    client: reqwest::Client,
    uri: Arc<str>,
    session_id: Arc<str>,
    api_key: Option<String>,
    next_id: AtomicU64,
    /// `result` of the `initialize` exchange.
    pub initialize: Value,
}

fn message(value: Value) -> anyhow::Result<ClientJsonRpcMessage> {
    serde_json::from_value(value).context("client message json must deserialize")
}

impl McpSession {
    pub async fn connect(uri: impl Into<Arc<str>>, api_key: Option<String>) -> anyhow::Result<Self> {
        Self::connect_with_version(uri, api_key, "2025-03-26").await
    }

    /// Initialize a session (sending `api_key` as a bearer token) and acknowledge it.
    pub async fn connect_with_version(
        uri: impl Into<Arc<str>>,
        api_key: Option<String>,
        protocol_version: &str,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let uri: Arc<str> = uri.into();

        let init = message(json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": protocol_version,
                "capabilities": {},
                "clientInfo": { "name": "unrelated-github-mcp-tests", "version": "0" }
            }
        }))?;
        let resp = client
            .post_message(uri.clone(), init, None, api_key.clone())
            .await
            .context("POST initialize")?;
        let (msg, session_id) = resp
            .expect_initialized::<reqwest::Error>()
            .await
            .context("expect initialize response")?;
        let session_id: Arc<str> = session_id.context("missing Mcp-Session-Id header")?.into();
        let initialize = serde_json::to_value(msg)?["result"].clone();

        let session = Self {
            client,
            uri,
            session_id,
            api_key,
            next_id: AtomicU64::new(1),
            initialize,
        };
        session.notify("notifications/initialized").await?;
        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        self.session_id.as_ref()
    }

    pub async fn notify(&self, method: &str) -> anyhow::Result<()> {
        let msg = message(json!({ "jsonrpc": "2.0", "method": method }))?;
        self.client
            .post_message(
                self.uri.clone(),
                msg,
                Some(self.session_id.clone()),
                self.api_key.clone(),
            )
            .await
            .with_context(|| format!("POST {method}"))?
            .expect_accepted::<reqwest::Error>()
            .context("expected 202 Accepted")?;
        Ok(())
    }

    /// One request; returns the whole JSON-RPC reply (`result` or `error`).
    pub async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let msg = message(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))?;
        let resp = self
            .client
            .post_message(
                self.uri.clone(),
                msg,
                Some(self.session_id.clone()),
                self.api_key.clone(),
            )
            .await
            .with_context(|| format!("POST {method}"))?;
        let reply = read_first_server_message(resp).await?;
        serde_json::to_value(reply).context("serialize server message to json")
    }

    /// Call a tool and return `(is_error, text)`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> anyhow::Result<(bool, String)> {
        let v = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        let result = v
            .get("result")
            .ok_or_else(|| anyhow::anyhow!("no result: {v}"))?;
        let is_error = result
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let text = result["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok((is_error, text))
    }

    /// Call a tool that must succeed and parse its JSON text.
    pub async fn call_tool_json(&self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        let (is_error, text) = self.call_tool(name, arguments).await?;
        anyhow::ensure!(!is_error, "{name} failed: {text}");
        Ok(serde_json::from_str(&text)?)
    }
}

async fn read_first_server_message(
    resp: StreamableHttpPostResponse,
) -> anyhow::Result<ServerJsonRpcMessage> {
    use anyhow::bail;
    use futures::StreamExt as _;

    match resp {
        StreamableHttpPostResponse::Json(msg, ..) => Ok(msg),
        StreamableHttpPostResponse::Sse(mut stream, ..) => {
            while let Some(evt) = stream.next().await {
                let evt = evt.context("read SSE event")?;
                let payload = evt.data.unwrap_or_default();
                if payload.trim().is_empty() {
                    continue;
                }
                let msg: ServerJsonRpcMessage =
                    serde_json::from_str(&payload).context("parse SSE data as JSON-RPC")?;
                return Ok(msg);
            }
            bail!("unexpected end of SSE stream")
        }
        StreamableHttpPostResponse::Accepted => bail!("unexpected 202 Accepted response"),
    }
}
