use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::job::JobId;

/// Resultado agregado de un job de WordCount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCountResult {
    pub job_id: JobId,
    pub word_counts: HashMap<String, u64>,
    pub total_words: u64,
    pub unique_words: usize,
}

impl WordCountResult {
    /// total_words y unique_words siempre se derivan del mapa.
    pub fn from_counts(job_id: JobId, word_counts: HashMap<String, u64>) -> Self {
        let total_words = word_counts.values().sum();
        let unique_words = word_counts.len();
        Self {
            job_id,
            word_counts,
            total_words,
            unique_words,
        }
    }

    /// Pares ordenados por conteo descendente y luego por palabra.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .word_counts
            .iter()
            .map(|(w, c)| (w.as_str(), *c))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conteo inválido en la línea {line_no}: {line:?}")]
pub struct OutputParseError {
    pub line_no: usize,
    pub line: String,
}

/// Parsea el contenido de un part-file (`palabra\tconteo` por línea).
///
/// Las líneas vacías y las que no tienen exactamente dos campos se
/// descartan. Un segundo campo que no es entero invalida toda la salida.
pub fn parse_part_file(contents: &str) -> Result<HashMap<String, u64>, OutputParseError> {
    let mut word_counts = HashMap::new();

    for (idx, line) in contents.trim().split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 2 {
            continue;
        }

        let count = fields[1].trim().parse::<u64>().map_err(|_| {
            OutputParseError {
                line_no: idx + 1,
                line: line.to_string(),
            }
        })?;
        word_counts.insert(fields[0].to_string(), count);
    }

    Ok(word_counts)
}
