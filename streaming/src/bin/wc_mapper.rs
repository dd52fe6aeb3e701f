use anyhow::Result;
use std::io::{self, BufWriter};
use tracing::debug;

fn main() -> Result<()> {
    streaming::init_logging("wc_mapper=info");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let emitted = streaming::run_mapper(stdin.lock(), BufWriter::new(stdout.lock()))?;

    debug!("mapper emitió {} registros", emitted);
    Ok(())
}
