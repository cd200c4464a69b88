use std::{fs, io::Write, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use coverzone::{BuildEvent, EditorConfig, GridCell, HexGridBuilder, IdleQueue, IncrementalScheduler, GridCache, GridRequest, write_cells_to_geojson_bytes};

use super::load_index;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::GridArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::read_from_path(path)?,
        None => EditorConfig::default(),
    };
    if let Some(grid_size) = args.grid_size { config.grid_size = grid_size }
    if let Some(batch_size) = args.batch_size { config.batch_size = batch_size }
    if args.clip { config.clip_edges = true }
    if args.no_clip { config.clip_edges = false }
    config.validate()?;

    let index = load_index(&args.counties)?;
    let county = index.resolve(&args.county)
        .ok_or_else(|| anyhow!("county {:?} not found in {}", args.county, args.counties))?
        .clone();

    let builder = HexGridBuilder::from_config(&config);
    tracing::info!(
        county = %county.geo_id,
        name = %county.name,
        grid_size = config.grid_size,
        clip = config.clip_edges,
        hex_km = builder.hex_size_km(&county.geometry).unwrap_or(f64::NAN),
        "building grid"
    );

    let cells = build(&county, builder, config.batch_size)?;
    tracing::info!(cells = cells.len(), "grid built");

    let bytes = write_cells_to_geojson_bytes(&county.geo_id, &cells)?;
    match &args.output {
        Some(path) => fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Drive the incremental scheduler to completion, one idle slot at a time.
fn build(county: &Arc<coverzone::CountyFeature>, builder: HexGridBuilder, batch_size: usize) -> Result<Arc<[GridCell]>> {
    let mut scheduler = IncrementalScheduler::new(GridCache::shared(), batch_size);
    let mut queue = IdleQueue::new();

    if let GridRequest::Ready(cells) = scheduler.request(&mut queue, county.clone(), builder) {
        return Ok(cells)
    }

    let mut slots = 0usize;
    while let Some(ticket) = queue.pop() {
        slots += 1;
        match scheduler.on_idle(&mut queue, ticket) {
            Some(BuildEvent::Completed { cells, .. }) => {
                tracing::debug!(slots, "build finished");
                return Ok(cells)
            }
            Some(BuildEvent::Failed { error, .. }) => bail!("grid build failed: {error}"),
            None => tracing::trace!(slots, "batch done"),
        }
    }

    bail!("grid build stopped before completing")
}
