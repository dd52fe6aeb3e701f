use anyhow::Result;
use std::io::{self, BufWriter};
use tracing::debug;

fn main() -> Result<()> {
    streaming::init_logging("wc_reducer=info");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let emitted = streaming::run_reducer(stdin.lock(), BufWriter::new(stdout.lock()))?;

    debug!("reducer emitió {} grupos", emitted);
    Ok(())
}
