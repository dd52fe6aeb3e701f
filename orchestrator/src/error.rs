use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{ErrorBody, StatusResponse, ValidationError};
use std::time::Duration;
use thiserror::Error;

use crate::command::CommandError;

/// Errores del pipeline de WordCount. Cada etapa falla con su propia
/// variante; la limpieza nunca produce uno de estos.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cuerpo del request ilegible (JSON mal formado, campo faltante,
    /// content-type incorrecto). Conserva el status del extractor.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("{message}")]
    Staging {
        message: String,
        returncode: Option<i32>,
    },

    #[error("{message}")]
    JobExecution {
        message: String,
        returncode: Option<i32>,
    },

    #[error("el job no terminó en {timeout:?} y fue cancelado")]
    JobTimeout { timeout: Duration },

    #[error("{message}")]
    Collection {
        message: String,
        returncode: Option<i32>,
    },

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for PipelineError {
    fn from(rejection: JsonRejection) -> Self {
        PipelineError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl PipelineError {
    pub fn staging(err: CommandError) -> Self {
        PipelineError::Staging {
            message: err.diagnostic(),
            returncode: err.code(),
        }
    }

    pub fn job_execution(err: CommandError) -> Self {
        PipelineError::JobExecution {
            message: err.diagnostic(),
            returncode: err.code(),
        }
    }

    pub fn collection(err: CommandError) -> Self {
        PipelineError::Collection {
            message: err.diagnostic(),
            returncode: err.code(),
        }
    }

    /// Nombre del tipo de error que se expone en el campo `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) | PipelineError::InvalidBody { .. } => "ValidationError",
            PipelineError::Staging { .. } => "StagingError",
            PipelineError::JobExecution { .. } | PipelineError::JobTimeout { .. } => {
                "JobExecutionError"
            }
            PipelineError::Collection { .. } => "CollectionError",
            PipelineError::Internal(_) => "InternalError",
        }
    }

    pub fn returncode(&self) -> Option<i32> {
        match self {
            PipelineError::Staging { returncode, .. }
            | PipelineError::JobExecution { returncode, .. }
            | PipelineError::Collection { returncode, .. } => *returncode,
            _ => None,
        }
    }

    pub fn to_body(&self) -> (StatusCode, ErrorBody) {
        if let PipelineError::Validation(e) = self {
            let body = ErrorBody {
                error: e.to_string(),
                returncode: None,
                kind: None,
            };
            return (StatusCode::BAD_REQUEST, body);
        }

        if let PipelineError::InvalidBody { status, message } = self {
            let body = ErrorBody {
                error: message.clone(),
                returncode: None,
                kind: Some(self.kind().to_string()),
            };
            return (*status, body);
        }

        // si falló un comando del cluster va el código; si no, el tipo
        let body = match self.returncode() {
            Some(code) => ErrorBody {
                error: format!("Hadoop error: {}", self),
                returncode: Some(code),
                kind: None,
            },
            None => ErrorBody {
                error: self.to_string(),
                returncode: None,
                kind: Some(self.kind().to_string()),
            },
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_body();
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ClusterHealthError {
    #[error("Cluster not responding")]
    NotResponding { stderr: String },

    /// El chequeo no se pudo ejecutar o venció el timeout.
    #[error("{0}")]
    CheckFailed(String),
}

impl IntoResponse for ClusterHealthError {
    fn into_response(self) -> Response {
        let body = match &self {
            ClusterHealthError::NotResponding { stderr } => {
                StatusResponse::error(self.to_string(), Some(stderr.clone()))
            }
            ClusterHealthError::CheckFailed(msg) => StatusResponse::error(msg.clone(), None),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
