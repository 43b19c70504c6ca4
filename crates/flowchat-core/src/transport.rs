//! Flow invocation: the [`Transport`] seam and its HTTP implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};

use crate::config::WidgetConfig;
use crate::error::{ChatError, TransportError};

/// Everything a flow invocation needs besides the endpoint itself
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    pub text: String,
    pub chat_inputs: Map<String, Value>,
    pub chat_input_field: String,
    pub tweaks: Option<Map<String, Value>>,
}

impl FlowRequest {
    /// JSON body for the process endpoint: the configured chat inputs with the
    /// user's text written into the input field.
    pub fn body(&self) -> Value {
        let mut inputs = self.chat_inputs.clone();
        inputs.insert(self.chat_input_field.clone(), Value::String(self.text.clone()));

        let mut body = Map::new();
        body.insert("inputs".to_string(), Value::Object(inputs));
        if let Some(tweaks) = &self.tweaks {
            body.insert("tweaks".to_string(), Value::Object(tweaks.clone()));
        }
        Value::Object(body)
    }
}

/// Raw payload of a successful flow invocation
#[derive(Debug, Clone, PartialEq)]
pub struct FlowResponse {
    pub data: Value,
}

/// Anything that can run a flow for one message.
pub trait Transport {
    fn send_message(
        &self,
        request: &FlowRequest,
    ) -> impl Future<Output = Result<FlowResponse, TransportError>> + Send;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    host_url: String,
    flow_id: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(host_url: &str, flow_id: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            host_url: host_url.trim_end_matches('/').to_string(),
            flow_id: flow_id.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, ChatError> {
        let mut transport = Self::new(&config.host_url, &config.flow_id, config.api_key.as_deref());
        if let Some(secs) = config.request_timeout_secs {
            transport.client = Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|e| ChatError::Config(format!("HTTP client: {e}")))?;
        }
        Ok(transport)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/v1/process/{}", self.host_url, self.flow_id)
    }
}

impl Transport for HttpTransport {
    async fn send_message(&self, request: &FlowRequest) -> Result<FlowResponse, TransportError> {
        let url = self.endpoint();
        tracing::debug!(%url, field = %request.chat_input_field, "invoking flow");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request.body());
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| TransportError::Decode(e.to_string()))?;
            return Err(TransportError::Server {
                status: status.as_u16(),
                detail: extract_detail(&text),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(FlowResponse { data })
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_merges_text_into_inputs() {
        let mut chat_inputs = Map::new();
        chat_inputs.insert("lang".to_string(), json!("en"));
        let request = FlowRequest {
            text: "hi".to_string(),
            chat_inputs,
            chat_input_field: "question".to_string(),
            tweaks: None,
        };
        assert_eq!(request.body(), json!({"inputs": {"lang": "en", "question": "hi"}}));
    }

    #[test]
    fn test_body_carries_tweaks() {
        let mut tweaks = Map::new();
        tweaks.insert("ChatOpenAI-1".to_string(), json!({"temperature": 0.2}));
        let request = FlowRequest {
            text: "hi".to_string(),
            chat_inputs: Map::new(),
            chat_input_field: "input".to_string(),
            tweaks: Some(tweaks),
        };
        assert_eq!(request.body()["tweaks"]["ChatOpenAI-1"]["temperature"], json!(0.2));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:7860/", "abc", None);
        assert_eq!(transport.endpoint(), "http://localhost:7860/api/v1/process/abc");
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(extract_detail(r#"{"detail":"boom"}"#), Some("boom".to_string()));
        assert_eq!(extract_detail(r#"{"detail":{"nested":1}}"#), None);
        assert_eq!(extract_detail("<html>"), None);
    }

    #[test]
    fn test_extract_detail_skips_empty() {
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
    }
}
