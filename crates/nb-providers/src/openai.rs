use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use nb_core::{
    CompletionRequest, CompletionResponse, Error, FinishReason, Message, Provider, Role, ToolCall,
    ToolDefinition, Usage,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible chat-completions APIs.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("newsbrief/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    fn build_request(&self, request: &CompletionRequest) -> OpenAIChatRequest {
        // Model priority: request > provider default
        // If neither is set, don't send model field (let API use its default)
        let model = request
            .model
            .clone()
            .or_else(|| self.default_model.clone());

        let messages = request.messages.iter().map(convert_message).collect();

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(convert_tool).collect())
        };

        OpenAIChatRequest {
            model,
            messages,
            temperature: request.temperature,
            tools,
        }
    }

    fn parse_response(&self, response: OpenAIChatResponse) -> Result<CompletionResponse, Error> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::api(500, "No choices in response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| -> Result<ToolCall, Error> {
                let raw = tc.function.arguments.trim();
                let arguments = if raw.is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(raw).map_err(|e| {
                        Error::tool(&tc.function.name, format!("invalid arguments: {}", e))
                    })?
                };
                Ok(ToolCall::new(tc.id, tc.function.name, arguments))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let content = choice.message.content.unwrap_or_default();

        let message = if tool_calls.is_empty() {
            Message::assistant(content)
        } else {
            Message::assistant_with_tool_calls(content, tool_calls)
        };

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            message,
            usage,
            model: response.model,
            finish_reason,
        })
    }

    fn parse_error(&self, status: u16, body: &str) -> Error {
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: ErrorDetail,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: String,
        }

        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => Error::from_status(status, err.error.message),
            Err(_) => Error::from_status(status, body.to_string()),
        }
    }
}

fn convert_message(message: &Message) -> OpenAIMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    // Assistant turns that only carry tool calls are sent with null content.
    let content = if message.content.is_empty() && !message.tool_calls.is_empty() {
        None
    } else {
        Some(message.content.clone())
    };

    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|tc| OpenAIToolCall {
                    id: tc.id.clone(),
                    r#type: "function".to_string(),
                    function: OpenAIFunctionCall {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect(),
        )
    };

    OpenAIMessage {
        role: role.to_string(),
        content,
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn convert_tool(tool: &ToolDefinition) -> OpenAITool {
    OpenAITool {
        r#type: "function".to_string(),
        function: OpenAIFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: serde_json::to_value(&tool.parameters).unwrap_or_default(),
        },
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        let api_request = self.build_request(&request);
        debug!(
            model = ?api_request.model,
            messages = api_request.messages.len(),
            tools = api_request.tools.as_ref().map_or(0, Vec::len),
            "OpenAI request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &error_text));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| Error::serialization(e.to_string()))?;

        self.parse_response(api_response)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    /// Model to use. Optional for servers that have a default model.
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    r#type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_creation() {
        let provider = OpenAIProvider::new("test-key");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), None);
    }

    #[test]
    fn test_provider_with_custom_model() {
        let provider = OpenAIProvider::new("test-key").with_default_model("gpt-3.5-turbo-0613");
        assert_eq!(provider.default_model(), Some("gpt-3.5-turbo-0613"));
    }

    #[test]
    fn test_build_request() {
        let provider = OpenAIProvider::new("test-key").with_default_model("test-model");
        let request = CompletionRequest::new(vec![Message::user("Hello")]).with_temperature(0.0);
        let api_request = provider.build_request(&request);

        assert_eq!(api_request.model, Some("test-model".to_string()));
        assert_eq!(api_request.temperature, Some(0.0));
        assert_eq!(api_request.messages.len(), 1);
        assert_eq!(api_request.messages[0].role, "user");
        assert!(api_request.tools.is_none());
    }

    #[test]
    fn test_build_request_no_model() {
        let provider = OpenAIProvider::new("test-key");
        let request = CompletionRequest::new(vec![Message::user("Hello")]);
        let api_request = provider.build_request(&request);

        // No model configured - field should be None (skipped in serialization)
        assert_eq!(api_request.model, None);
    }

    #[test]
    fn test_tool_call_message_has_null_content() {
        let call = ToolCall::new("call-1", "latest_news", serde_json::json!({}));
        let converted = convert_message(&Message::assistant_with_tool_calls("", vec![call]));
        let json = serde_json::to_value(&converted).unwrap();

        assert!(json["content"].is_null());
        assert_eq!(json["tool_calls"][0]["function"]["name"], "latest_news");
        assert_eq!(json["tool_calls"][0]["function"]["arguments"], "{}");
    }

    #[test]
    fn test_parse_error_maps_status() {
        let provider = OpenAIProvider::new("test-key");
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert!(provider.parse_error(401, body).is_auth_error());
        assert!(matches!(provider.parse_error(429, body), Error::RateLimit(_)));
        assert!(matches!(provider.parse_error(400, body), Error::InvalidRequest(_)));
        assert!(matches!(
            provider.parse_error(503, "upstream down"),
            Error::Api { status: 503, .. }
        ));
    }

    #[test]
    fn test_malformed_tool_arguments_name_the_tool() {
        let provider = OpenAIProvider::new("test-key");
        let response: OpenAIChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-3.5-turbo-0613",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {"name": "latest_news", "arguments": "{not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        match provider.parse_response(response).unwrap_err() {
            Error::Tool { tool, message } => {
                assert_eq!(tool, "latest_news");
                assert!(message.contains("invalid arguments"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo-0613",
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-3.5-turbo-0613",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call-1",
                            "type": "function",
                            "function": {"name": "latest_news", "arguments": "{}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 40, "completion_tokens": 7}
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("sk-test")
            .with_base_url(server.uri())
            .with_default_model("gpt-3.5-turbo-0613");
        let request = CompletionRequest::new(vec![Message::user("Summarize")]).with_temperature(0.0);
        let response = provider.complete(request).await.unwrap();

        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.message.tool_calls.len(), 1);
        assert_eq!(response.message.tool_calls[0].name, "latest_news");
        assert_eq!(response.usage.total_tokens, 47);
    }

    #[tokio::test]
    async fn test_complete_reports_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::new("bad").with_base_url(server.uri());
        let err = provider
            .complete(CompletionRequest::new(vec![Message::user("Hi")]))
            .await
            .unwrap_err();

        assert!(err.is_auth_error());
        assert!(err.to_string().contains("Incorrect API key"));
    }
}
