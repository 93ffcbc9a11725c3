//! Splice job runner: the step pipeline plus guaranteed cleanup.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use super::create_splice_pipeline;
use super::errors::{PipelineError, PipelineResult};
use super::temp::{CleanupReport, TempScope};
use super::types::{Context, SpliceState};

/// Result of a successful splice job.
#[derive(Debug, Clone)]
pub struct SpliceResult {
    /// The spliced file.
    pub output_path: PathBuf,
    /// Steps that completed.
    pub steps_completed: Vec<String>,
    /// Steps with nothing to do (zero-length head, tail or middle).
    pub steps_skipped: Vec<String>,
    /// What the cleanup pass removed.
    pub cleanup: CleanupReport,
}

/// Run the full splice pipeline for one original/companion pair.
///
/// Temporary files are released after the last step runs or the first step
/// fails. Cleanup problems are logged, never returned.
pub fn run_splice_job(ctx: &Context) -> PipelineResult<SpliceResult> {
    ctx.logger.phase(&format!("Splice: {}", ctx.job_name));

    if let Some(dir) = ctx.output_path.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            PipelineError::setup_failed(
                &ctx.job_name,
                format!("cannot create {}: {}", dir.display(), e),
            )
        })?;
    }

    let temps = TempScope::new(ctx.settings.paths.temp_dir(), &ctx.job_name);
    let job_id = format!("{}-{}", ctx.job_name, Local::now().format("%Y%m%d%H%M%S"));
    let mut state = SpliceState::new(job_id, temps);
    tracing::debug!(
        job_id = %state.job_id,
        temp_root = %state.temps.root().display(),
        "Splice job started"
    );

    let outcome = create_splice_pipeline().run(ctx, &mut state);

    ctx.logger.section("Cleanup");
    let cleanup = state.temps.release(Some(&ctx.logger));
    ctx.logger.info(&format!(
        "Removed {} temp file(s){}",
        cleanup.removed,
        if cleanup.failed.is_empty() {
            String::new()
        } else {
            format!(", {} could not be deleted", cleanup.failed.len())
        }
    ));

    let run = outcome?;
    tracing::debug!(
        "Splice of {} ran {} step(s), {} skipped",
        ctx.job_name,
        run.total_steps(),
        run.steps_skipped.len()
    );
    let output_path = state.output.take().ok_or_else(|| {
        PipelineError::validation_failed(&ctx.job_name, "pipeline finished without an output")
    })?;

    ctx.logger
        .success(&format!("Spliced {} -> {}", ctx.job_name, output_path.display()));

    Ok(SpliceResult {
        output_path,
        steps_completed: run.steps_completed,
        steps_skipped: run.steps_skipped,
        cleanup,
    })
}
