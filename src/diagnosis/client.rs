use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AnalysisRequest, DiagnosisError, DiagnosisResult, DiagnosisService, FollowUpQuestion};
use crate::models::{clamp_unit, Condition, Sex};

/// The diagnosis function never returns more than this many conditions.
pub const MAX_CONDITIONS: usize = 5;

/// HTTP client for the hosted diagnosis function.
pub struct HttpDiagnosisClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpDiagnosisClient {
    /// Create a client posting to `endpoint` with a per-request timeout.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DiagnosisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiagnosisError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs: timeout.as_secs(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body for the diagnosis function.
#[derive(Serialize)]
struct DiagnosisRequestBody<'a> {
    symptoms: Vec<SymptomEvidence<'a>>,
    age: u16,
    sex: Sex,
}

#[derive(Serialize)]
struct SymptomEvidence<'a> {
    symptom_name: &'a str,
    severity: u8,
}

/// Response body from the diagnosis function.
#[derive(Deserialize)]
struct DiagnosisResponseBody {
    #[serde(default)]
    success: bool,
    analysis: Option<AnalysisBody>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct AnalysisBody {
    #[serde(default)]
    conditions: Vec<ConditionBody>,
    question: Option<QuestionBody>,
    #[serde(default)]
    confidence_score: f32,
}

#[derive(Deserialize)]
struct ConditionBody {
    name: String,
    #[serde(default)]
    probability: f32,
}

#[derive(Deserialize)]
struct QuestionBody {
    text: String,
}

impl DiagnosisResponseBody {
    fn into_result(self) -> Result<DiagnosisResult, DiagnosisError> {
        if !self.success {
            return Err(DiagnosisError::Unsuccessful(
                self.error.unwrap_or_else(|| "success=false".to_string()),
            ));
        }
        let analysis = self
            .analysis
            .ok_or_else(|| DiagnosisError::ResponseParsing("missing analysis".to_string()))?;

        Ok(DiagnosisResult {
            conditions: analysis
                .conditions
                .into_iter()
                .take(MAX_CONDITIONS)
                .map(|c| Condition {
                    name: c.name,
                    probability: clamp_unit(c.probability),
                })
                .collect(),
            question: analysis
                .question
                .filter(|q| !q.text.trim().is_empty())
                .map(|q| FollowUpQuestion { text: q.text }),
            confidence: clamp_unit(analysis.confidence_score),
        })
    }
}

#[async_trait]
impl DiagnosisService for HttpDiagnosisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<DiagnosisResult, DiagnosisError> {
        let body = DiagnosisRequestBody {
            symptoms: request
                .evidence
                .iter()
                .map(|e| SymptomEvidence {
                    symptom_name: &e.name,
                    severity: e.severity,
                })
                .collect(),
            age: request.age,
            sex: request.sex,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                DiagnosisError::Connection(self.endpoint.clone())
            } else if e.is_timeout() {
                DiagnosisError::Timeout(self.timeout_secs)
            } else {
                DiagnosisError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: DiagnosisResponseBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                DiagnosisError::Timeout(self.timeout_secs)
            } else {
                DiagnosisError::ResponseParsing(e.to_string())
            }
        })?;

        let result = parsed.into_result()?;
        tracing::debug!(
            conditions = result.conditions.len(),
            has_question = result.question.is_some(),
            "Diagnosis response parsed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::Evidence;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/analyze")
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            evidence: vec![Evidence {
                name: "headache".into(),
                severity: 3,
            }],
            age: 34,
            sex: Sex::Male,
        }
    }

    fn client(url: &str, secs: u64) -> HttpDiagnosisClient {
        HttpDiagnosisClient::new(url, Some("test-key".into()), Duration::from_secs(secs)).unwrap()
    }

    #[tokio::test]
    async fn parses_successful_analysis_and_sends_wire_format() {
        let seen: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::new(Mutex::new(None));
        let seen_in_handler = seen.clone();
        let router = Router::new().route(
            "/analyze",
            post(move |headers: axum::http::HeaderMap, Json(body): Json<Value>| {
                let seen = seen_in_handler.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *seen.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "success": true,
                        "analysis": {
                            "conditions": [
                                {"id": "c_55", "name": "Tension headache", "probability": 0.64},
                                {"id": "c_49", "name": "Migraine", "probability": 0.21}
                            ],
                            "should_stop": false,
                            "question": {"text": "Is the pain on one side of your head?"},
                            "confidence_score": 0.64
                        }
                    }))
                }
            }),
        );
        let url = serve(router).await;

        let result = client(&url, 5).analyze(&request()).await.unwrap();
        assert_eq!(result.conditions.len(), 2);
        assert_eq!(result.conditions[0].name, "Tension headache");
        assert_eq!(
            result.question.unwrap().text,
            "Is the pain on one side of your head?"
        );
        assert!((result.confidence - 0.64).abs() < f32::EPSILON);

        let (body, auth) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["symptoms"][0]["symptom_name"], "headache");
        assert_eq!(body["symptoms"][0]["severity"], 3);
        assert_eq!(body["age"], 34);
        assert_eq!(body["sex"], "male");
        assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn success_false_is_a_failure() {
        let router = Router::new().route(
            "/analyze",
            post(|| async { Json(json!({"success": false, "error": "No symptoms provided"})) }),
        );
        let url = serve(router).await;

        let err = client(&url, 5).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, DiagnosisError::Unsuccessful(msg) if msg == "No symptoms provided"));
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let router = Router::new().route(
            "/analyze",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "credentials not configured"})),
                )
            }),
        );
        let url = serve(router).await;

        match client(&url, 5).analyze(&request()).await {
            Err(DiagnosisError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("credentials not configured"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let router = Router::new().route(
            "/analyze",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"success": true, "analysis": {"conditions": []}}))
            }),
        );
        let url = serve(router).await;

        let err = client(&url, 1).analyze(&request()).await.unwrap_err();
        assert!(matches!(err, DiagnosisError::Timeout(1)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}/analyze"), 2)
            .analyze(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, DiagnosisError::Connection(_)));
    }

    #[test]
    fn conditions_capped_and_probabilities_clamped() {
        let body: DiagnosisResponseBody = serde_json::from_value(json!({
            "success": true,
            "analysis": {
                "conditions": [
                    {"name": "A", "probability": 1.4},
                    {"name": "B", "probability": 0.5},
                    {"name": "C", "probability": 0.4},
                    {"name": "D", "probability": 0.3},
                    {"name": "E", "probability": 0.2},
                    {"name": "F", "probability": 0.1}
                ],
                "confidence_score": 1.4
            }
        }))
        .unwrap();
        let result = body.into_result().unwrap();
        assert_eq!(result.conditions.len(), MAX_CONDITIONS);
        assert_eq!(result.conditions[0].probability, 1.0);
        assert_eq!(result.confidence, 1.0);
        assert!(result.question.is_none());
    }

    #[test]
    fn missing_analysis_is_parse_error() {
        let body: DiagnosisResponseBody =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(
            body.into_result(),
            Err(DiagnosisError::ResponseParsing(_))
        ));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let c = client("http://localhost:9/analyze/", 1);
        assert_eq!(c.endpoint(), "http://localhost:9/analyze");
    }
}
