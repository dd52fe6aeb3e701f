use async_trait::async_trait;
use std::{process::Stdio, time::Duration};
use thiserror::Error;
use tracing::debug;

/// Un comando externo a ejecutar (docker, hdfs, hadoop...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// None si el proceso terminó por señal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no se pudo ejecutar `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` excedió el tiempo límite de {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` terminó con código {code:?}")]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl CommandError {
    /// Texto de diagnóstico: stderr, si no stdout, si no la descripción del error.
    pub fn diagnostic(&self) -> String {
        match self {
            CommandError::Failed { stdout, stderr, .. } => {
                if !stderr.trim().is_empty() {
                    stderr.clone()
                } else if !stdout.trim().is_empty() {
                    stdout.clone()
                } else {
                    self.to_string()
                }
            }
            other => other.to_string(),
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

/// Frontera con el mundo exterior: todo comando pasa por aquí.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;

    /// Como `run`, pero un código distinto de cero es error.
    async fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let output = self.run(spec).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                command: spec.display(),
                code: output.code,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }
}

/// Ejecuta comandos reales con `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        debug!("ejecutando: {}", spec.display());

        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // si vence el timeout, el futuro se descarta y el hijo se mata
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| CommandError::Spawn {
            command: spec.display(),
            source,
        })?;

        let waited = match spec.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| CommandError::Timeout {
                    command: spec.display(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|source| CommandError::Spawn {
            command: spec.display(),
            source,
        })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
