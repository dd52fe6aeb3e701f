use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_CONTAINER: &str = "namenode";
pub const DEFAULT_STREAMING_JAR: &str =
    "/opt/hadoop-3.2.1/share/hadoop/tools/lib/hadoop-streaming-3.2.1.jar";
pub const DEFAULT_MAPPER_PATH: &str = "/opt/mapreduce/wc-mapper";
pub const DEFAULT_REDUCER_PATH: &str = "/opt/mapreduce/wc-reducer";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_STATUS_TIMEOUT_SECS: u64 = 10;

/// Configuración del orquestador, leída una vez de variables de entorno.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub bind_addr: String,
    /// Contenedor donde corren `hdfs` y `hadoop` (se usa con `docker exec`)
    pub container: String,
    pub streaming_jar: String,
    pub mapper_path: String,
    pub reducer_path: String,
    /// Directorio local para los archivos de entrada temporales
    pub local_staging_dir: PathBuf,
    pub job_timeout: Duration,
    pub status_timeout: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let local_staging_dir = env::var("LOCAL_STAGING_DIR")
            .map(PathBuf::from)
            .or_else(|_| env::current_dir())
            .unwrap_or_else(|_| env::temp_dir());

        Self {
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            container: env_or("HADOOP_CONTAINER", DEFAULT_CONTAINER),
            streaming_jar: env_or("STREAMING_JAR", DEFAULT_STREAMING_JAR),
            mapper_path: env_or("MAPPER_PATH", DEFAULT_MAPPER_PATH),
            reducer_path: env_or("REDUCER_PATH", DEFAULT_REDUCER_PATH),
            local_staging_dir,
            job_timeout: env_secs("JOB_TIMEOUT_SECS", DEFAULT_JOB_TIMEOUT_SECS),
            status_timeout: env_secs("STATUS_TIMEOUT_SECS", DEFAULT_STATUS_TIMEOUT_SECS),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            container: DEFAULT_CONTAINER.to_string(),
            streaming_jar: DEFAULT_STREAMING_JAR.to_string(),
            mapper_path: DEFAULT_MAPPER_PATH.to_string(),
            reducer_path: DEFAULT_REDUCER_PATH.to_string(),
            local_staging_dir: env::temp_dir(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            status_timeout: Duration::from_secs(DEFAULT_STATUS_TIMEOUT_SECS),
        }
    }
}
