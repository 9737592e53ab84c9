//! Gemini `generateContent` backend.

use crate::model::{
    Backend, ModelError, ModelRequest, ModelResponse, Part, ProposedCall, Role, ToolConfig, Turn,
    Usage,
};
use crate::schema::FunctionDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ApiToolConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<ApiPart>,
}

/// A content part. Exactly one payload field is set; `thoughtSignature`
/// rides along with a `functionCall`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolConfig<'a> {
    function_calling_config: ApiFunctionCallingConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFunctionCallingConfig<'a> {
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_function_names: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiBackendBuilder {
    api_key: String,
    model: String,
    base_url: String,
    system: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn build(self) -> GeminiBackend {
        GeminiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            system: self.system,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Gemini API backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    system: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> GeminiBackendBuilder {
        GeminiBackendBuilder::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Model => "model",
        }
    }

    fn turn_to_api(turn: &Turn) -> ApiContent {
        let parts = turn
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => ApiPart {
                    text: Some(text.clone()),
                    ..ApiPart::default()
                },
                Part::FunctionCall(call) => ApiPart {
                    function_call: Some(ApiFunctionCall {
                        name: call.name.clone(),
                        args: call.args.clone(),
                    }),
                    thought_signature: call.thought_signature.clone(),
                    ..ApiPart::default()
                },
                Part::FunctionResponse(outcome) => ApiPart {
                    function_response: Some(ApiFunctionResponse {
                        name: outcome.name.clone(),
                        response: outcome.response(),
                    }),
                    ..ApiPart::default()
                },
            })
            .collect();

        ApiContent {
            role: Some(Self::role_to_api(turn.role)),
            parts,
        }
    }

    fn tool_config_to_api(config: ToolConfig<'_>) -> ApiToolConfig<'_> {
        let function_calling_config = if config.force_call {
            ApiFunctionCallingConfig {
                mode: "ANY",
                allowed_function_names: Some(config.allowed_names),
            }
        } else {
            ApiFunctionCallingConfig {
                mode: "AUTO",
                allowed_function_names: None,
            }
        };
        ApiToolConfig {
            function_calling_config,
        }
    }

    fn build_request<'a>(&'a self, request: &ModelRequest<'a>) -> ApiRequest<'a> {
        let contents = request
            .conversation
            .turns()
            .iter()
            .map(Self::turn_to_api)
            .collect();

        let system_instruction = self.system.as_ref().map(|system| ApiContent {
            role: None,
            parts: vec![ApiPart {
                text: Some(system.clone()),
                ..ApiPart::default()
            }],
        });

        let (tools, tool_config) = match request.tool_config {
            Some(config) => (
                vec![ApiTool {
                    function_declarations: config.declarations,
                }],
                Some(Self::tool_config_to_api(config)),
            ),
            None => (Vec::new(), None),
        };

        let generation_config = (self.temperature.is_some() || self.max_output_tokens.is_some())
            .then(|| ApiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            });

        ApiRequest {
            contents,
            system_instruction,
            tools,
            tool_config,
            generation_config,
        }
    }

    fn response_to_model(response: ApiResponse) -> ModelResponse {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        let mut texts = Vec::new();
        let mut calls = Vec::new();
        for part in parts {
            if let Some(text) = part.text {
                texts.push(text);
            }
            if let Some(call) = part.function_call {
                calls.push(ProposedCall {
                    name: call.name,
                    args: call.args,
                    thought_signature: part.thought_signature,
                });
            }
        }

        let usage = response
            .usage_metadata
            .map(|usage| Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            })
            .unwrap_or_default();

        ModelResponse {
            text: (!texts.is_empty()).then(|| texts.concat()),
            calls,
            usage,
        }
    }
}

impl std::fmt::Display for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gemini({})", self.model)
    }
}

impl Backend for GeminiBackend {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let response = Self::response_to_model(api_response);
        debug!(
            calls = response.calls.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model responded"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CallOutcome, Conversation};
    use crate::schema::{ToolDescriptor, translate};
    use mockito::Matcher;
    use serde_json::json;

    fn declarations() -> Vec<FunctionDeclaration> {
        let schema = json!({
            "properties": {
                "brightness": {"type": "number"},
                "colorTemperature": {"type": "string"}
            },
            "required": ["brightness", "colorTemperature"]
        });
        vec![translate(&ToolDescriptor::from_input_schema(
            "controlLight",
            "Set the room lights",
            schema.as_object().unwrap(),
        ))]
    }

    fn request_json(backend: &GeminiBackend, request: ModelRequest<'_>) -> Value {
        serde_json::to_value(backend.build_request(&request)).unwrap()
    }

    #[test]
    fn display() {
        let backend = GeminiBackend::builder("key", "gemini-2.0-flash-001").build();
        assert_eq!(backend.to_string(), "gemini(gemini-2.0-flash-001)");
    }

    #[test]
    fn forced_request_restricts_allowed_names() {
        let backend = GeminiBackend::builder("key", "m").build();
        let declarations = declarations();
        let names = vec!["controlLight".to_string()];
        let conversation = Conversation::start("Dim the lights");
        let body = request_json(
            &backend,
            ModelRequest {
                conversation: &conversation,
                tool_config: Some(ToolConfig {
                    force_call: true,
                    allowed_names: &names,
                    declarations: &declarations,
                }),
            },
        );

        assert_eq!(
            body["contents"],
            json!([{"role": "user", "parts": [{"text": "Dim the lights"}]}])
        );
        assert_eq!(
            body["toolConfig"],
            json!({"functionCallingConfig": {"mode": "ANY", "allowedFunctionNames": ["controlLight"]}})
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["parameters"]["properties"]["brightness"]["type"],
            "NUMBER"
        );
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn unconstrained_request_carries_full_conversation_without_tools() {
        let backend = GeminiBackend::builder("key", "m")
            .system("Be brief.")
            .temperature(0.2)
            .build();
        let mut args = Map::new();
        args.insert("brightness".into(), json!(30));
        let conversation = Conversation::start("Dim the lights")
            .appended(Turn::proposals(vec![ProposedCall::new("controlLight", args)]))
            .appended(Turn::outcomes(vec![CallOutcome::error(
                "controlLight",
                "device offline",
            )]));

        let body = request_json(
            &backend,
            ModelRequest {
                conversation: &conversation,
                tool_config: None,
            },
        );

        assert!(body.get("tools").is_none());
        assert!(body.get("toolConfig").is_none());
        assert_eq!(
            body["contents"][1],
            json!({"role": "model", "parts": [{"functionCall": {"name": "controlLight", "args": {"brightness": 30}}}]})
        );
        assert_eq!(
            body["contents"][2],
            json!({"role": "user", "parts": [{"functionResponse": {"name": "controlLight", "response": {"error": "device offline"}}}]})
        );
        assert_eq!(body["systemInstruction"], json!({"parts": [{"text": "Be brief."}]}));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.2f32));
    }

    #[test]
    fn parses_calls_in_order_and_text() {
        let response: ApiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "controlLight", "args": {"brightness": 25, "colorTemperature": "warm"}}},
                        {"functionCall": {"name": "playMusic"}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 7, "totalTokenCount": 19}
        }))
        .unwrap();

        let model = GeminiBackend::response_to_model(response);
        assert_eq!(model.text, None);
        assert_eq!(model.calls.len(), 2);
        assert_eq!(model.calls[0].name, "controlLight");
        assert_eq!(model.calls[0].args["colorTemperature"], "warm");
        assert!(model.calls[1].args.is_empty());
        assert_eq!(model.usage, Usage { input_tokens: 12, output_tokens: 7 });
    }

    #[test]
    fn thought_signature_is_replayed_with_its_call() {
        let response: ApiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "controlLight", "args": {}}, "thoughtSignature": "c2ln"}
                    ]
                }
            }]
        }))
        .unwrap();

        let model = GeminiBackend::response_to_model(response);
        assert_eq!(model.calls[0].thought_signature.as_deref(), Some("c2ln"));

        let backend = GeminiBackend::builder("key", "m").build();
        let conversation =
            Conversation::start("Dim the lights").appended(Turn::proposals(model.calls));
        let body = request_json(
            &backend,
            ModelRequest {
                conversation: &conversation,
                tool_config: None,
            },
        );
        assert_eq!(
            body["contents"][1]["parts"][0],
            json!({"functionCall": {"name": "controlLight", "args": {}}, "thoughtSignature": "c2ln"})
        );
    }

    #[test]
    fn empty_candidates_yield_no_text() {
        let response: ApiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        let model = GeminiBackend::response_to_model(response);
        assert_eq!(model, ModelResponse::default());
    }

    #[tokio::test]
    async fn posts_to_generate_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"candidates": [{"content": {"parts": [{"text": "Hi "}, {"text": "there"}]}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let backend = GeminiBackend::builder("test-key", "gemini-test")
            .base_url(format!("{}/", server.url()))
            .build();
        let conversation = Conversation::start("hello");
        let response = backend
            .generate(ModelRequest {
                conversation: &conversation,
                tool_config: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text.as_deref(), Some("Hi there"));
        assert!(response.calls.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(429)
            .with_body("quota exhausted")
            .create_async()
            .await;

        let backend = GeminiBackend::builder("k", "gemini-test")
            .base_url(server.url())
            .build();
        let conversation = Conversation::start("hello");
        let err = backend
            .generate(ModelRequest {
                conversation: &conversation,
                tool_config: None,
            })
            .await
            .unwrap_err();

        match err {
            ModelError::Api(message) => {
                assert!(message.starts_with("429"));
                assert!(message.contains("quota exhausted"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-test:generateContent")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let backend = GeminiBackend::builder("k", "gemini-test")
            .base_url(server.url())
            .build();
        let conversation = Conversation::start("hello");
        let err = backend
            .generate(ModelRequest {
                conversation: &conversation,
                tool_config: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
