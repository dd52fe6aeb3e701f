use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use common::{ErrorBody, StatusResponse, WordCountRequest, WordCountResult};
use reqwest::Client;
use std::{env, fs, path::PathBuf};

/// - En Docker: ORCHESTRATOR_URL=http://orchestrator:8000
/// - Local: default http://localhost:8000
fn orchestrator_base_url() -> String {
    env::var("ORCHESTRATOR_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el orquestador de WordCount")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consulta la salud del cluster Hadoop
    Status,

    /// Envía un texto (o un archivo) y muestra el conteo de palabras
    Count {
        #[arg(value_name = "TEXTO", conflicts_with = "file")]
        text: Option<String>,

        /// Lee el texto desde un archivo local
        #[arg(long, value_name = "ARCHIVO")]
        file: Option<PathBuf>,

        /// Cuántas palabras mostrar (las más frecuentes)
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(t), _) => Ok(t),
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("no se pudo leer {}", path.display())),
        (None, None) => bail!("hay que pasar un TEXTO o --file"),
    }
}

/// Arma el reporte que se imprime para un resultado.
fn render_result(result: &WordCountResult, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Job {}:\n", result.job_id));
    out.push_str(&format!("  total_words : {}\n", result.total_words));
    out.push_str(&format!("  unique_words: {}\n", result.unique_words));

    let ranked = result.ranked();
    if ranked.is_empty() {
        out.push_str("  (sin palabras)\n");
        return out;
    }

    let width = ranked
        .iter()
        .take(top)
        .map(|(w, _)| w.chars().count())
        .max()
        .unwrap_or(0);
    for (word, count) in ranked.iter().take(top) {
        out.push_str(&format!("    {:<width$}  {}\n", word, count, width = width));
    }
    if ranked.len() > top {
        out.push_str(&format!("    ... y {} más\n", ranked.len() - top));
    }
    out
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = orchestrator_base_url();

    match cli.command {
        Commands::Status => {
            let url = format!("{}/api/status", base_url);
            let resp = client.get(&url).send().await?;
            let ok = resp.status().is_success();
            let status: StatusResponse = resp.json().await?;

            println!("Cluster: {} ({})", status.status, status.message);
            if let Some(stderr) = status.stderr {
                println!("  stderr: {}", stderr.trim());
            }
            if !ok {
                std::process::exit(1);
            }
        }

        Commands::Count { text, file, top } => {
            let text = read_input(text, file)?;
            let url = format!("{}/api/wordcount", base_url);
            let resp = client
                .post(&url)
                .json(&WordCountRequest { text })
                .send()
                .await?;

            if resp.status().is_success() {
                let result: WordCountResult = resp.json().await?;
                print!("{}", render_result(&result, top));
            } else {
                let status = resp.status();
                let err: ErrorBody = resp.json().await?;
                eprintln!("Error (status {}): {}", status, err.error);
                if let Some(code) = err.returncode {
                    eprintln!("  returncode: {}", code);
                }
                if let Some(kind) = err.kind {
                    eprintln!("  tipo: {}", kind);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
