use anyhow::{anyhow, Result};
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess};
use rmcp::ServiceExt;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

use stackpath_llm::ToolSpec;

/// Connection to one external tool server.
///
/// The tool list is fetched once at connect time; clients live for the
/// process and are reused opportunistically across requests.
pub struct McpClient {
    server_name: String,
    service: RunningService<RoleClient, ()>,
    tools: Vec<ToolSpec>,
}

impl McpClient {
    /// Spawn a local tool-server process and connect over stdio.
    pub async fn connect_stdio(
        server_name: impl Into<String>,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let server_name = server_name.into();

        let cmd = Command::new(command).configure(|c| {
            for arg in args {
                c.arg(arg);
            }
            for (key, value) in env {
                c.env(key, value);
            }
            c.stdin(Stdio::piped());
            c.stdout(Stdio::piped());
            c.stderr(Stdio::inherit());
        });

        let transport = TokioChildProcess::new(cmd)?;
        let service = ().serve(transport).await?;

        Self::finish_connect(server_name, service).await
    }

    /// Connect to a remote tool server over streamable HTTP.
    pub async fn connect_http(
        server_name: impl Into<String>,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        let server_name = server_name.into();

        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            let name: reqwest::header::HeaderName = key.parse()?;
            header_map.insert(name, value.parse()?);
        }
        let http = reqwest::Client::builder()
            .default_headers(header_map)
            .build()?;

        let transport = StreamableHttpClientTransport::with_client(
            http,
            rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig::with_uri(
                url.to_string(),
            ),
        );
        let service = ().serve(transport).await?;

        Self::finish_connect(server_name, service).await
    }

    async fn finish_connect(
        server_name: String,
        service: RunningService<RoleClient, ()>,
    ) -> Result<Self> {
        let listed = service.list_tools(Default::default()).await?;
        let tools = listed
            .tools
            .into_iter()
            .map(|tool| ToolSpec {
                name: tool.name.to_string(),
                description: tool.description.map(|d| d.to_string()),
                parameters: Value::Object((*tool.input_schema).clone()),
            })
            .collect::<Vec<_>>();

        tracing::info!(server = %server_name, tools = tools.len(), "Connected to tool server");

        Ok(Self {
            server_name,
            service,
            tools,
        })
    }

    pub fn name(&self) -> &str {
        &self.server_name
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Call a tool and render its content blocks to a single string.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(anyhow!(
                    "Tool arguments must be an object, got: {}",
                    other
                ))
            }
        };

        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
            })
            .await?;

        let rendered = result
            .content
            .iter()
            .map(|content| {
                if let Some(text) = content.as_text() {
                    text.text.clone()
                } else {
                    serde_json::to_string(content).unwrap_or_default()
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error.unwrap_or(false) {
            return Err(anyhow!("Tool '{}' reported an error: {}", name, rendered));
        }

        Ok(rendered)
    }
}
