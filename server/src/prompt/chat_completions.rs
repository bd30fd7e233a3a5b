use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use crate::{server_config::ModelConfig, HttpClient};

use super::{ChatApiResponseOrError, LanguageModel, LlmError, LlmResult, ResponseFormat};

/// OpenAI-compatible chat completions client (Cerebras by default).
pub struct ChatCompletionsModel {
    http_client: HttpClient,
    api_key: String,
    config: ModelConfig,
}

impl ChatCompletionsModel {
    pub fn new(http_client: HttpClient, api_key: String, config: ModelConfig) -> Self {
        Self {
            http_client,
            api_key,
            config,
        }
    }

    fn request_body(&self, prompt: &str, format: ResponseFormat) -> serde_json::Value {
        let mut body = json!({
            "model": &self.config.id,
            "temperature": self.config.temperature,
            "messages": [
              {
                "role": "user",
                "content": prompt
              }
            ]
        });
        if self.config.json_mode && format == ResponseFormat::JsonObject {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsModel {
    async fn complete(&self, prompt: &str, format: ResponseFormat) -> LlmResult<String> {
        let resp = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, format))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        parse_completion(resp)
    }
}

fn parse_completion(resp: serde_json::Value) -> LlmResult<String> {
    let parsed = serde_json::from_value::<ChatApiResponseOrError>(resp.clone())
        .context(format!("Could not parse chat response: {}", resp))
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    let parsed = match parsed {
        ChatApiResponseOrError::Error(error) => {
            return Err(LlmError::Api(error.message));
        }
        ChatApiResponseOrError::Response(parsed) => parsed,
    };

    if let Some(usage) = &parsed.usage {
        tracing::debug!("Completion used {} tokens", usage.total_tokens);
    }

    let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
    Ok(choice.message.content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(json_mode: bool) -> ChatCompletionsModel {
        ChatCompletionsModel::new(
            HttpClient::new(),
            "key".to_string(),
            ModelConfig {
                json_mode,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_parse_completion_content() {
        let resp = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "  {\"category\": \"HVAC\"}\n"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        assert_eq!(parse_completion(resp).unwrap(), "{\"category\": \"HVAC\"}");
    }

    #[test]
    fn test_parse_completion_error_envelope() {
        let resp = json!({"message": "Wrong API Key", "type": "invalid_request_error"});
        assert!(matches!(parse_completion(resp), Err(LlmError::Api(m)) if m == "Wrong API Key"));
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let resp = json!({"choices": []});
        assert!(matches!(parse_completion(resp), Err(LlmError::EmptyResponse)));
        assert!(matches!(
            parse_completion(json!({"unexpected": true})),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_json_mode_follows_requested_format() {
        let body = model(true).request_body("Classify this", ResponseFormat::JsonObject);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "user");

        let body = model(false).request_body("Classify this", ResponseFormat::JsonObject);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_text_request_ignores_json_in_prompt() {
        let prompt = "1. [IT Support] Low - JSON export on badge printer broken";
        let body = model(true).request_body(prompt, ResponseFormat::Text);
        assert!(body.get("response_format").is_none());
    }
}
