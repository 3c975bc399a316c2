use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Static tool-server configuration file: `{"servers": [...]}`.
/// Read once per agent construction; no write path exists.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsFile {
    #[serde(default)]
    pub servers: Vec<ToolServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub name: String,

    #[serde(default = "enabled_default")]
    pub enabled: bool,

    #[serde(rename = "type")]
    pub transport: ServerTransport,

    // stdio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    // http
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServerTransport {
    Stdio,
    Http,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stdio_and_http_servers() {
        let raw = r#"{
            "servers": [
                {"name": "fs", "enabled": true, "type": "stdio", "command": "npx", "args": ["-y", "server-fs"]},
                {"name": "search", "enabled": false, "type": "http", "url": "http://localhost:3100/mcp", "headers": {"authorization": "Bearer x"}}
            ]
        }"#;

        let file: ToolsFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.servers.len(), 2);
        assert_eq!(file.servers[0].transport, ServerTransport::Stdio);
        assert_eq!(file.servers[0].args, vec!["-y", "server-fs"]);
        assert!(!file.servers[1].enabled);
        assert_eq!(file.servers[1].url.as_deref(), Some("http://localhost:3100/mcp"));
    }

    #[test]
    fn enabled_defaults_to_true() {
        let raw = r#"{"servers": [{"name": "fs", "type": "stdio", "command": "npx"}]}"#;
        let file: ToolsFile = serde_json::from_str(raw).unwrap();
        assert!(file.servers[0].enabled);
    }
}
