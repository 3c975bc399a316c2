use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use stackpath_types::{ContentItem, MessageContent};

use crate::message::AgentMessage;
use crate::streaming::parse_sse_stream;
use crate::traits::{ChatClient, ChatRequest, LlmEventStream};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat client for any OpenAI-compatible completions endpoint.
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_body(request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request.messages.iter().map(wire_message).collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "stream": true,
        });

        if let Some(temp) = request.options.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = request.options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(tools) = &request.options.tools {
            if !tools.is_empty() {
                body["tools"] = Value::Array(
                    tools
                        .iter()
                        .map(|t| {
                            json!({
                                "type": "function",
                                "function": {
                                    "name": t.name,
                                    "description": t.description,
                                    "parameters": t.parameters,
                                }
                            })
                        })
                        .collect(),
                );
                body["tool_choice"] = json!("auto");
            }
        }

        body
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<LlmEventStream> {
        let body = Self::build_body(&request);

        tracing::debug!(model = %request.model, messages = request.messages.len(), "Opening chat stream");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Chat API error {}: {}", status, text));
        }

        Ok(parse_sse_stream(response))
    }
}

fn wire_message(message: &AgentMessage) -> Value {
    match message {
        AgentMessage::System { content } => json!({
            "role": "system",
            "content": wire_content(content),
        }),
        AgentMessage::Human { content } => json!({
            "role": "user",
            "content": wire_content(content),
        }),
        AgentMessage::AI {
            content,
            tool_calls,
            ..
        } => {
            let mut value = json!({ "role": "assistant" });
            if let Some(content) = content {
                value["content"] = Value::String(content.joined_text());
            }
            if let Some(calls) = tool_calls {
                value["tool_calls"] = Value::Array(
                    calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.args.to_string(),
                                }
                            })
                        })
                        .collect(),
                );
            }
            value
        }
        AgentMessage::Tool {
            tool_call_id,
            content,
        } => json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content.joined_text(),
        }),
    }
}

fn wire_content(content: &MessageContent) -> Value {
    match content {
        MessageContent::Text(text) => Value::String(text.clone()),
        MessageContent::Items(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    ContentItem::Text { text } => json!({ "type": "text", "text": text }),
                    ContentItem::ImageUrl { url } => {
                        json!({ "type": "image_url", "image_url": { "url": url } })
                    }
                    // Providers have no file-reference part; describe it as text.
                    ContentItem::File {
                        name, mime_type, ..
                    } => json!({
                        "type": "text",
                        "text": format!("[attached file: {} ({})]", name, mime_type),
                    }),
                })
                .collect(),
        ),
    }
}
