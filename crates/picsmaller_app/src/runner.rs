use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use picsmaller_core::{CompressOptions, Origin};
use picsmaller_engine::{probe_origin, ArchiveOptions, DirectorySink, ImageTransformer, Pipeline};
use picsmaller_logging::{pipeline_info, pipeline_warn};

use crate::report::render_table;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

pub struct RunPlan {
    pub inputs: Vec<PathBuf>,
    pub out: PathBuf,
    pub options: CompressOptions,
    pub archive: ArchiveOptions,
    pub each: bool,
    pub archive_enabled: bool,
}

pub async fn run(plan: RunPlan) -> anyhow::Result<()> {
    let origins = read_inputs(&plan.inputs).await;
    anyhow::ensure!(!origins.is_empty(), "none of the inputs is a readable image");

    let pipeline = Pipeline::builder(
        Arc::new(ImageTransformer),
        Arc::new(DirectorySink::new(plan.out.clone())),
    )
    .options(plan.options)
    .archive(plan.archive)
    .build()?;

    let keys = pipeline.submit_batch(origins)?;
    pipeline_info!("Compressing {} image(s)", keys.len());
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    loop {
        tokio::select! {
            _ = pipeline.wait_idle() => break,
            _ = ticker.tick() => {
                if let Some(view) = pipeline.changed_view() {
                    pipeline_info!("Progress {}", view.progress_hint());
                }
            }
        }
    }

    let view = pipeline.view();
    print!("{}", render_table(&view));

    if plan.each {
        let paths = pipeline.export_each()?;
        pipeline_info!("Saved {} file(s) to {:?}", paths.len(), plan.out);
    }
    if plan.archive_enabled {
        let summary = pipeline
            .export_archive()
            .await
            .context("failed to export archive")?;
        println!(
            "Archive {} holds {} image(s)",
            summary.path.display(),
            summary.entries.len()
        );
    }
    if view.failed_count > 0 {
        pipeline_warn!("{} image(s) could not be compressed", view.failed_count);
    }
    Ok(())
}

/// Reads every input; unreadable files and non-images are skipped with a warning.
async fn read_inputs(paths: &[PathBuf]) -> Vec<Origin> {
    let mut origins = Vec::with_capacity(paths.len());
    for path in paths {
        match read_input(path).await {
            Ok(origin) => origins.push(origin),
            Err(err) => pipeline_warn!("Skipping {:?}: {:#}", path, err),
        }
    }
    origins
}

async fn read_input(path: &Path) -> anyhow::Result<Origin> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{path:?} has no usable file name"))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    Ok(probe_origin(name, bytes)?)
}
