//! Ejecutables de Hadoop streaming para WordCount.
//!
//! Hadoop invoca el mapper y el reducer como procesos: leen registros por
//! stdin y escriben `palabra\tconteo` por stdout. Los logs van a stderr.

use common::wordcount::{format_record, map_line, reduce_sorted};
use std::io::{self, BufRead, Write};

/// Mapper: cada línea de entrada -> una línea `token\t1` por palabra.
pub fn run_mapper<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<u64> {
    let mut emitted = 0;
    for line in input.lines() {
        let line = line?;
        for (token, count) in map_line(&line) {
            writeln!(output, "{}", format_record(&token, count))?;
            emitted += 1;
        }
    }
    output.flush()?;
    Ok(emitted)
}

/// Reducer: entrada ordenada por clave -> una línea `palabra\ttotal` por grupo.
pub fn run_reducer<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<u64> {
    let mut lines = input.lines();
    let mut read_error = None;

    // el adaptador corta al primer error de lectura y lo devolvemos al final
    let records = std::iter::from_fn(|| match lines.next()? {
        Ok(line) => Some(line),
        Err(e) => {
            read_error = Some(e);
            None
        }
    });

    let mut emitted = 0;
    for (word, total) in reduce_sorted(records) {
        writeln!(output, "{}", format_record(&word, total))?;
        emitted += 1;
    }

    if let Some(e) = read_error {
        return Err(e);
    }
    output.flush()?;
    Ok(emitted)
}

/// Logs a stderr: stdout es el canal de datos de Hadoop.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
