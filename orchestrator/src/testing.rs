//! Doble de prueba del cluster: registra etapas y borrados en memoria.

use async_trait::async_trait;
use common::wordcount::{format_record, map_line, reduce_sorted};
use common::Job;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::cluster::{Cluster, JobLayout, StagedArtifact};
use crate::error::{ClusterHealthError, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stage,
    Run,
    Read,
}

#[derive(Debug, Clone)]
enum Output {
    /// Simula el job: mapper -> sort -> reducer sobre el texto subido
    Counting,
    Fixed(String),
}

#[derive(Debug, Clone)]
enum Health {
    Ok,
    NotResponding(String),
    CheckFailed(String),
}

#[derive(Clone)]
pub struct FakeCluster {
    output: Output,
    health: Health,
    fail_at: Option<Stage>,
    fail_deletes: bool,
    run_delay: Option<Duration>,
    stages: Arc<Mutex<Vec<Stage>>>,
    deletions: Arc<Mutex<Vec<StagedArtifact>>>,
    staged_text: Arc<Mutex<Option<String>>>,
    job_id: Arc<Mutex<Option<String>>>,
}

impl FakeCluster {
    fn new(output: Output) -> Self {
        Self {
            output,
            health: Health::Ok,
            fail_at: None,
            fail_deletes: false,
            run_delay: None,
            stages: Arc::new(Mutex::new(Vec::new())),
            deletions: Arc::new(Mutex::new(Vec::new())),
            staged_text: Arc::new(Mutex::new(None)),
            job_id: Arc::new(Mutex::new(None)),
        }
    }

    pub fn counting() -> Self {
        Self::new(Output::Counting)
    }

    pub fn with_output(raw: &str) -> Self {
        Self::new(Output::Fixed(raw.to_string()))
    }

    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// `run_job` tarda `delay` antes de terminar.
    pub fn slow_run(mut self, delay: Duration) -> Self {
        self.run_delay = Some(delay);
        self
    }

    pub fn not_responding(mut self, stderr: &str) -> Self {
        self.health = Health::NotResponding(stderr.to_string());
        self
    }

    pub fn check_failing(mut self, msg: &str) -> Self {
        self.health = Health::CheckFailed(msg.to_string());
        self
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn deletions(&self) -> Vec<StagedArtifact> {
        self.deletions.lock().unwrap().clone()
    }

    /// Espera (hasta ~2s) a que se registren al menos `n` borrados.
    pub async fn wait_for_deletions(&self, n: usize) -> bool {
        for _ in 0..200 {
            if self.deletions.lock().unwrap().len() >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    pub fn last_job_id(&self) -> Option<String> {
        self.job_id.lock().unwrap().clone()
    }

    fn enter(&self, stage: Stage, layout: &JobLayout) -> bool {
        self.stages.lock().unwrap().push(stage);
        *self.job_id.lock().unwrap() = Some(layout.job_id.clone());
        self.fail_at == Some(stage)
    }

    fn simulated_output(&self) -> String {
        let text = self.staged_text.lock().unwrap().clone().unwrap_or_default();
        let mut intermediate: Vec<String> = text
            .lines()
            .flat_map(map_line)
            .map(|(w, c)| format_record(&w, c))
            .collect();
        intermediate.sort();

        reduce_sorted(intermediate)
            .map(|(w, c)| format_record(&w, c) + "\n")
            .collect()
    }
}

#[async_trait]
impl Cluster for FakeCluster {
    async fn health(&self) -> Result<(), ClusterHealthError> {
        match &self.health {
            Health::Ok => Ok(()),
            Health::NotResponding(stderr) => Err(ClusterHealthError::NotResponding {
                stderr: stderr.clone(),
            }),
            Health::CheckFailed(msg) => Err(ClusterHealthError::CheckFailed(msg.clone())),
        }
    }

    async fn stage_input(&self, job: &Job, layout: &JobLayout) -> Result<(), PipelineError> {
        if self.enter(Stage::Stage, layout) {
            return Err(PipelineError::Staging {
                message: "Error: No such container: namenode".to_string(),
                returncode: Some(1),
            });
        }
        *self.staged_text.lock().unwrap() = Some(job.input_text.clone());
        Ok(())
    }

    async fn run_job(&self, layout: &JobLayout) -> Result<(), PipelineError> {
        if self.enter(Stage::Run, layout) {
            return Err(PipelineError::JobExecution {
                message: "Streaming Command Failed!".to_string(),
                returncode: Some(1),
            });
        }
        if let Some(delay) = self.run_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn read_output(&self, layout: &JobLayout) -> Result<String, PipelineError> {
        if self.enter(Stage::Read, layout) {
            return Err(PipelineError::Collection {
                message: "No such file or directory".to_string(),
                returncode: Some(1),
            });
        }
        Ok(match &self.output {
            Output::Counting => self.simulated_output(),
            Output::Fixed(raw) => raw.clone(),
        })
    }

    async fn delete(&self, artifact: &StagedArtifact) -> anyhow::Result<()> {
        self.deletions.lock().unwrap().push(artifact.clone());
        if self.fail_deletes {
            anyhow::bail!("borrado simulado falló: {}", artifact);
        }
        Ok(())
    }
}
