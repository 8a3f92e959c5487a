use crate::app::config::InspectArgs;
use anyhow::Context;
use snowmint::SnowflakeId;
use std::io::{self, Write};

/// Runs `snowmint inspect`, printing one line per decoded ID.
pub fn run(args: &InspectArgs) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    for raw in &args.ids {
        let id: SnowflakeId = raw
            .parse()
            .with_context(|| format!("cannot decode {raw:?}"))?;
        writeln!(out, "{}", describe(id))?;
    }
    Ok(())
}

fn describe(id: SnowflakeId) -> String {
    format!(
        "{id} timestamp={} unix_ms={} worker_id={} sequence={}",
        id.timestamp(),
        id.unix_millis(),
        id.worker_id(),
        id.sequence()
    )
}
