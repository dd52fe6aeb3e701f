//! Pipeline de un job de WordCount:
//! validar -> id -> subir entrada -> correr hadoop -> leer salida -> limpiar.
//!
//! La limpieza corre siempre, pase lo que pase en las etapas anteriores,
//! y sus errores nunca reemplazan el resultado del pipeline.

use common::{parse_part_file, Job, WordCountResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cluster::{Cluster, JobLayout, StagedArtifact};
use crate::config::OrchestratorConfig;
use crate::error::PipelineError;

/// Artefactos temporales de un job, adquiridos antes de subir nada.
/// `release` los borra (consume el guard, así que corre una sola vez).
/// Si el guard se descarta sin `release` (futuro cancelado, panic),
/// el borrado se lanza en segundo plano sobre el runtime actual.
pub struct JobArtifacts {
    job_id: String,
    items: Vec<StagedArtifact>,
    cluster: Arc<dyn Cluster>,
    released: bool,
}

/// Intenta borrar cada artefacto; sigue aunque alguno falle.
/// Devuelve cuántos borrados fallaron.
async fn delete_all(cluster: &dyn Cluster, job_id: &str, items: &[StagedArtifact]) -> usize {
    let mut failures = 0;
    for artifact in items {
        match cluster.delete(artifact).await {
            Ok(()) => debug!("job {}: borrado {}", job_id, artifact),
            Err(e) => {
                failures += 1;
                warn!("job {}: no se pudo borrar {}: {:#}", job_id, artifact, e);
            }
        }
    }
    failures
}

impl JobArtifacts {
    pub fn acquire(layout: &JobLayout, cluster: Arc<dyn Cluster>) -> Self {
        Self {
            job_id: layout.job_id.clone(),
            items: layout.artifacts(),
            cluster,
            released: false,
        }
    }

    pub async fn release(mut self) -> usize {
        self.released = true;
        delete_all(self.cluster.as_ref(), &self.job_id, &self.items).await
    }
}

impl Drop for JobArtifacts {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                "job {}: artefactos sin liberar y sin runtime, quedan {} pendientes",
                self.job_id,
                self.items.len()
            );
            return;
        };

        warn!(
            "job {}: artefactos sin liberar, limpieza en segundo plano",
            self.job_id
        );
        let cluster = Arc::clone(&self.cluster);
        let items = std::mem::take(&mut self.items);
        let job_id = self.job_id.clone();
        handle.spawn(async move {
            let failures = delete_all(cluster.as_ref(), &job_id, &items).await;
            if failures > 0 {
                warn!("job {}: limpieza diferida incompleta ({} fallos)", job_id, failures);
            }
        });
    }
}

/// Corre un WordCount completo sobre el cluster.
pub async fn run_wordcount(
    cluster: Arc<dyn Cluster>,
    config: &OrchestratorConfig,
    text: String,
) -> Result<WordCountResult, PipelineError> {
    // texto vacío: error antes de generar id o tocar el cluster
    let job = Job::new(text)?;
    info!(
        "job {}: recibido ({} bytes) a las {}",
        job.id,
        job.input_text.len(),
        job.created_at
    );

    let layout = JobLayout::new(&job.id, &config.local_staging_dir);
    let artifacts = JobArtifacts::acquire(&layout, Arc::clone(&cluster));

    let outcome = execute_stages(cluster.as_ref(), &job, &layout).await;

    let failures = artifacts.release().await;
    if failures > 0 {
        warn!("job {}: limpieza incompleta ({} fallos)", job.id, failures);
    }

    match &outcome {
        Ok(result) => info!(
            "job {}: OK total_words={} unique_words={}",
            job.id, result.total_words, result.unique_words
        ),
        Err(e) => warn!("job {}: falló ({}): {}", job.id, e.kind(), e),
    }
    outcome
}

/// Lanza el pipeline como tarea propia: si quien espera se va (cliente
/// desconectado), el job igual termina y limpia sus artefactos.
pub async fn spawn_wordcount(
    cluster: Arc<dyn Cluster>,
    config: Arc<OrchestratorConfig>,
    text: String,
) -> Result<WordCountResult, PipelineError> {
    let handle =
        tokio::spawn(async move { run_wordcount(cluster, &config, text).await });

    handle
        .await
        .map_err(|e| PipelineError::Internal(format!("la tarea del job terminó mal: {}", e)))?
}

async fn execute_stages(
    cluster: &dyn Cluster,
    job: &Job,
    layout: &JobLayout,
) -> Result<WordCountResult, PipelineError> {
    cluster.stage_input(job, layout).await?;
    cluster.run_job(layout).await?;

    let raw = cluster.read_output(layout).await?;
    let word_counts = parse_part_file(&raw).map_err(|e| PipelineError::Collection {
        message: e.to_string(),
        returncode: None,
    })?;

    Ok(WordCountResult::from_counts(job.id.clone(), word_counts))
}
