//! OpenAI chat-completions client.

use super::{CompletionService, http_agent};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Sends a single user message with no history.
pub struct OpenAi {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAi {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            agent: http_agent(None),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model: model.into(),
        }
    }

    /// Override the completions endpoint (any OpenAI-compatible server).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl CompletionService for OpenAi {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
        };

        let mut resp = self
            .agent
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.as_deref().unwrap_or_default()),
            )
            .header("Content-Type", "application/json")
            .send_json(&request)?;

        let body: ChatResponse = resp.body_mut().read_json()?;
        first_choice(body)
    }
}

fn first_choice(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(Error::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 200,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_first_choice() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": " Expand. "}},
                            {"message": {"role": "assistant", "content": "ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice(body).unwrap(), " Expand. ");
    }

    #[test]
    fn test_no_choices() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_choice(body), Err(Error::EmptyCompletion)));
    }
}
