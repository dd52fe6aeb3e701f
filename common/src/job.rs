use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type JobId = String;

/// Largo del identificador corto de un job.
pub const JOB_ID_LEN: usize = 8;

/// Genera un id corto (8 caracteres) a partir de un UUID v4.
/// Sirve para nombrar todos los artefactos temporales del job.
pub fn new_job_id() -> JobId {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(JOB_ID_LEN);
    id
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No text provided")]
    EmptyText,
}

/// Un job de WordCount: vive sólo mientras dura el request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub input_text: String,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Valida el texto antes de generar el id: un texto vacío
    /// nunca llega a tener job_id ni artefactos.
    pub fn new(input_text: impl Into<String>) -> Result<Self, ValidationError> {
        let input_text = input_text.into();
        if input_text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        Ok(Self {
            id: new_job_id(),
            input_text,
            created_at: Utc::now(),
        })
    }
}
