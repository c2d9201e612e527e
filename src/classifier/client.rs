//! OpenAI-compatible classifier client.
//!
//! Works with any OpenAI-compatible chat completions endpoint that
//! supports structured outputs via `response_format`.

use super::prompts::Prompts;
use super::schema::{self, QuestionClassification};
use crate::config::LlmConfig;
use crate::error::{AnalyzerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    /// Send a chat completion request, optionally with a structured
    /// output `response_format`.
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        response_format: Option<Value>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_completion_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            response_format,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(AnalyzerError::ClassifierApi(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(AnalyzerError::ClassifierApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| AnalyzerError::ClassifierApi(format!("Malformed response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AnalyzerError::ClassifierApi("No choices in response".to_string()))?;

        Ok(choice.message.content)
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let messages = vec![Message::user("Say 'hello' and nothing else.")];

        let response = self.chat(messages, None).await?;

        if response.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(AnalyzerError::ClassifierApi(format!(
                "Unexpected response: {}",
                response
            )))
        }
    }
}

/// Classifier for bias evaluation questions.
pub struct QuestionClassifier {
    client: LlmClient,
}

impl QuestionClassifier {
    /// Create a classifier over an existing client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Create from LLM config.
    pub fn from_config(config: LlmConfig) -> Self {
        Self::new(LlmClient::new(config))
    }

    /// Classify one evaluation question.
    ///
    /// Returns the validated verdict together with the raw JSON the
    /// service produced.
    pub async fn classify(&self, question: &str) -> Result<(QuestionClassification, Value)> {
        let messages = vec![
            Message::system(Prompts::classification_instructions()),
            Message::user(question),
        ];
        let content = self
            .client
            .chat(messages, Some(schema::response_format()))
            .await?;
        Self::parse_classification(&content)
    }

    /// Validate the service's output against the declared schema.
    fn parse_classification(content: &str) -> Result<(QuestionClassification, Value)> {
        let raw: Value = serde_json::from_str(content).map_err(|e| {
            AnalyzerError::ClassifierParse(format!(
                "Response is not valid JSON: {}. Response: {}",
                e, content
            ))
        })?;
        let validated: QuestionClassification = serde_json::from_value(raw.clone())
            .map_err(|e| AnalyzerError::ClassifierParse(e.to_string()))?;
        Ok((validated, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::BiasCategory;

    #[test]
    fn test_message_creation() {
        let sys = Message::system("You are helpful.");
        let user = Message::user("Hello!");

        assert!(matches!(sys.role, Role::System));
        assert!(matches!(user.role, Role::User));
    }

    #[test]
    fn test_endpoint_construction() {
        let config = LlmConfig {
            api_base: "https://api.example.com/".to_string(),
            api_key: "test".to_string(),
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        let client = LlmClient::new(config);
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/v1/chat/completions"
        );

        // Without trailing slash
        let config2 = LlmConfig {
            api_base: "https://api.example.com".to_string(),
            api_key: "test".to_string(),
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        let client2 = LlmClient::new(config2);
        assert_eq!(
            client2.endpoint(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_classification_valid() {
        let content = r#"{
            "is_bias_eval": true,
            "is_categorized": true,
            "category": "gender_bias",
            "explanation_if_categorized": "Targets gendered assumptions.",
            "explanation_if_not_bias_eval": null
        }"#;
        let (validated, raw) = QuestionClassifier::parse_classification(content).unwrap();
        assert!(validated.is_bias_eval);
        assert_eq!(validated.category, Some(BiasCategory::Gender));
        assert_eq!(raw["category"], "gender_bias");
    }

    #[test]
    fn test_parse_classification_rejects_unknown_category() {
        let content = r#"{
            "is_bias_eval": true,
            "is_categorized": true,
            "category": "weather_bias",
            "explanation_if_categorized": null,
            "explanation_if_not_bias_eval": null
        }"#;
        let result = QuestionClassifier::parse_classification(content);
        assert!(matches!(result, Err(AnalyzerError::ClassifierParse(_))));
    }

    #[test]
    fn test_parse_classification_rejects_non_json() {
        let result = QuestionClassifier::parse_classification("Sure! Here is my analysis...");
        assert!(matches!(result, Err(AnalyzerError::ClassifierParse(_))));
    }
}
