use serde::{Deserialize, Serialize};

/* --------- Payloads HTTP del orquestador --------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCountRequest {
    pub text: String,
}

/// Respuesta de `GET /api/status`, tanto en éxito como en error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl StatusResponse {
    pub fn running() -> Self {
        Self {
            status: "running".to_string(),
            message: "Cluster is healthy".to_string(),
            stderr: None,
        }
    }

    pub fn error(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            stderr,
        }
    }
}

/// Cuerpo de error de `POST /api/wordcount`.
/// `returncode` va cuando falló un comando; `type` cuando no.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returncode: Option<i32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
