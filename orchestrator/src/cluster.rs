use async_trait::async_trait;
use common::Job;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::{CommandError, CommandRunner, CommandSpec};
use crate::config::OrchestratorConfig;
use crate::error::{ClusterHealthError, PipelineError};

pub const DFS_INPUT_DIR: &str = "/input";
pub const DFS_OUTPUT_DIR: &str = "/output";
pub const CONTAINER_TMP_DIR: &str = "/tmp";

/// Rutas de un job, todas derivadas del job_id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLayout {
    pub job_id: String,
    pub local_input: PathBuf,
    pub container_input: String,
    pub dfs_input: String,
    pub dfs_output_dir: String,
}

impl JobLayout {
    pub fn new(job_id: &str, local_dir: &Path) -> Self {
        let input_file = format!("input_{}.txt", job_id);
        Self {
            job_id: job_id.to_string(),
            local_input: local_dir.join(&input_file),
            container_input: format!("{}/{}", CONTAINER_TMP_DIR, input_file),
            dfs_input: format!("{}/{}", DFS_INPUT_DIR, input_file),
            dfs_output_dir: format!("{}/output_{}", DFS_OUTPUT_DIR, job_id),
        }
    }

    /// Sólo se lee la primera partición (el job corre con un único reducer).
    pub fn part_file(&self) -> String {
        format!("{}/part-00000", self.dfs_output_dir)
    }

    /// Todos los artefactos que el job puede llegar a crear.
    pub fn artifacts(&self) -> Vec<StagedArtifact> {
        vec![
            StagedArtifact::LocalFile(self.local_input.clone()),
            StagedArtifact::ContainerFile(self.container_input.clone()),
            StagedArtifact::DfsPath(self.dfs_input.clone()),
            StagedArtifact::DfsPath(self.dfs_output_dir.clone()),
        ]
    }
}

/// Un artefacto temporal de un job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedArtifact {
    LocalFile(PathBuf),
    ContainerFile(String),
    DfsPath(String),
}

impl std::fmt::Display for StagedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StagedArtifact::LocalFile(p) => write!(f, "local:{}", p.display()),
            StagedArtifact::ContainerFile(p) => write!(f, "container:{}", p),
            StagedArtifact::DfsPath(p) => write!(f, "dfs:{}", p),
        }
    }
}

/// Operaciones del pipeline contra el cluster.
#[async_trait]
pub trait Cluster: Send + Sync {
    async fn health(&self) -> Result<(), ClusterHealthError>;

    async fn stage_input(&self, job: &Job, layout: &JobLayout) -> Result<(), PipelineError>;

    /// Bloquea hasta que el job termina (o vence el timeout).
    async fn run_job(&self, layout: &JobLayout) -> Result<(), PipelineError>;

    async fn read_output(&self, layout: &JobLayout) -> Result<String, PipelineError>;

    async fn delete(&self, artifact: &StagedArtifact) -> anyhow::Result<()>;
}

/// Cluster Hadoop dentro de un contenedor Docker, manejado con
/// `docker cp` / `docker exec`.
pub struct HadoopCluster<R> {
    runner: R,
    config: OrchestratorConfig,
}

fn streaming_command(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    format!("./{}", name)
}

impl<R: CommandRunner> HadoopCluster<R> {
    pub fn new(runner: R, config: OrchestratorConfig) -> Self {
        Self { runner, config }
    }

    /// `docker exec <contenedor> <args...>`
    fn exec<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut full = vec!["exec".to_string(), self.config.container.clone()];
        full.extend(args.into_iter().map(Into::into));
        CommandSpec::new("docker", full)
    }

    fn streaming_job(&self, layout: &JobLayout) -> CommandSpec {
        let cfg = &self.config;
        self.exec([
            "hadoop".to_string(),
            "jar".to_string(),
            cfg.streaming_jar.clone(),
            "-D".to_string(),
            "mapreduce.job.reduces=1".to_string(),
            "-files".to_string(),
            format!("{},{}", cfg.mapper_path, cfg.reducer_path),
            "-mapper".to_string(),
            streaming_command(&cfg.mapper_path),
            "-reducer".to_string(),
            streaming_command(&cfg.reducer_path),
            "-input".to_string(),
            layout.dfs_input.clone(),
            "-output".to_string(),
            layout.dfs_output_dir.clone(),
        ])
        .with_timeout(cfg.job_timeout)
    }

    /// Best-effort: mata el cliente de hadoop del job dentro del contenedor.
    async fn kill_job(&self, layout: &JobLayout) {
        let spec = self.exec(["pkill", "-f", layout.dfs_output_dir.as_str()]);
        match self.runner.run(&spec).await {
            Ok(out) if out.success() => info!("job {} cancelado", layout.job_id),
            Ok(out) => warn!(
                "pkill del job {} terminó con código {:?}",
                layout.job_id, out.code
            ),
            Err(e) => warn!("no se pudo cancelar el job {}: {}", layout.job_id, e),
        }
    }
}

#[async_trait]
impl<R: CommandRunner> Cluster for HadoopCluster<R> {
    async fn health(&self) -> Result<(), ClusterHealthError> {
        let spec = self
            .exec(["hdfs", "dfsadmin", "-report"])
            .with_timeout(self.config.status_timeout);

        match self.runner.run(&spec).await {
            Ok(out) if out.success() => Ok(()),
            Ok(out) => Err(ClusterHealthError::NotResponding { stderr: out.stderr }),
            Err(e) => Err(ClusterHealthError::CheckFailed(e.to_string())),
        }
    }

    async fn stage_input(&self, job: &Job, layout: &JobLayout) -> Result<(), PipelineError> {
        let local_err = |e: std::io::Error| PipelineError::Staging {
            message: format!(
                "no se pudo escribir {}: {}",
                layout.local_input.display(),
                e
            ),
            returncode: None,
        };

        // 1) archivo local temporal
        if let Some(parent) = layout.local_input.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(local_err)?;
            }
        }
        tokio::fs::write(&layout.local_input, job.input_text.as_bytes())
            .await
            .map_err(local_err)?;

        // 2) copiarlo al contenedor
        let cp = CommandSpec::new(
            "docker",
            [
                "cp".to_string(),
                layout.local_input.to_string_lossy().to_string(),
                format!("{}:{}", self.config.container, layout.container_input),
            ],
        );
        self.runner.run_checked(&cp).await.map_err(PipelineError::staging)?;

        // 3) directorio de entrada en HDFS (idempotente)
        let mkdir = self.exec(["hdfs", "dfs", "-mkdir", "-p", DFS_INPUT_DIR]);
        self.runner
            .run_checked(&mkdir)
            .await
            .map_err(PipelineError::staging)?;

        // 4) subir / sobrescribir
        let dest = format!("{}/", DFS_INPUT_DIR);
        let put = self.exec([
            "hdfs",
            "dfs",
            "-put",
            "-f",
            layout.container_input.as_str(),
            dest.as_str(),
        ]);
        self.runner.run_checked(&put).await.map_err(PipelineError::staging)?;

        info!("job {}: entrada subida a {}", layout.job_id, layout.dfs_input);
        Ok(())
    }

    async fn run_job(&self, layout: &JobLayout) -> Result<(), PipelineError> {
        for exe in [&self.config.mapper_path, &self.config.reducer_path] {
            let chmod = self.exec(["chmod", "+x", exe.as_str()]);
            self.runner
                .run_checked(&chmod)
                .await
                .map_err(PipelineError::job_execution)?;
        }

        let spec = self.streaming_job(layout);
        info!("job {}: lanzando hadoop streaming", layout.job_id);

        match self.runner.run_checked(&spec).await {
            Ok(_) => {
                info!("job {}: hadoop terminó OK", layout.job_id);
                Ok(())
            }
            Err(CommandError::Timeout { timeout, .. }) => {
                warn!("job {}: timeout tras {:?}", layout.job_id, timeout);
                self.kill_job(layout).await;
                Err(PipelineError::JobTimeout { timeout })
            }
            Err(e) => Err(PipelineError::job_execution(e)),
        }
    }

    async fn read_output(&self, layout: &JobLayout) -> Result<String, PipelineError> {
        let part = layout.part_file();
        let cat = self.exec(["hdfs", "dfs", "-cat", part.as_str()]);
        let out = self
            .runner
            .run_checked(&cat)
            .await
            .map_err(PipelineError::collection)?;
        Ok(out.stdout)
    }

    async fn delete(&self, artifact: &StagedArtifact) -> anyhow::Result<()> {
        let spec = match artifact {
            StagedArtifact::LocalFile(path) => {
                tokio::fs::remove_file(path).await?;
                return Ok(());
            }
            StagedArtifact::ContainerFile(path) => self.exec(["rm", "-f", path.as_str()]),
            StagedArtifact::DfsPath(path) => {
                self.exec(["hdfs", "dfs", "-rm", "-r", "-f", path.as_str()])
            }
        };
        self.runner.run_checked(&spec).await?;
        Ok(())
    }
}
