// One pipeline run: connect, execute the three script units in order,
// then render the reports.  First script failure aborts the run.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use duckdb::Connection;
use log::{error, info, warn};

use crate::config::PipelineConfig;
use crate::db;
use crate::error::PipelineError;
use crate::report;
use crate::script::{self, ScriptOutcome};

/// The fixed, ordered script units of a run.
pub const SCRIPT_NAMES: [&str; 3] = [
    "01_ingestion.sql",
    "02_transformations.sql",
    "03_analysis.sql",
];

#[derive(Debug)]
pub struct RunSummary {
    pub scripts_run: usize,
    pub elapsed: Duration,
}

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Pipeline {
        Pipeline { config }
    }

    /// Script paths in execution order.
    pub fn scripts(&self) -> Vec<PathBuf> {
        SCRIPT_NAMES
            .iter()
            .map(|name| self.config.scripts_dir.join(name))
            .collect()
    }

    /// Run the pipeline end to end.  The connection is opened here, owned
    /// by this call, and closed on every exit path: success, script
    /// failure, or reporting error.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        info!("starting sales analysis pipeline");

        fs::create_dir_all(&self.config.output_dir)?;
        let conn = db::connect(&self.config.db_path)?;

        let result = self.run_scripts_and_report(&conn, start);

        // runs on every exit path of run_scripts_and_report
        if let Err((_, e)) = conn.close() {
            warn!("failed to close database connection: {}", e);
        }

        if let Ok(ref summary) = result {
            info!(
                "pipeline finished in {:.2} seconds",
                summary.elapsed.as_secs_f64()
            );
            match fs::canonicalize(&self.config.output_dir) {
                Ok(dir) => info!("artifacts written to {}", dir.display()),
                Err(_) => info!("artifacts written to {}", self.config.output_dir.display()),
            }
        }
        result
    }

    fn run_scripts_and_report(
        &self,
        conn: &Connection,
        start: Instant,
    ) -> Result<RunSummary, PipelineError> {
        let mut scripts_run = 0;
        for path in self.scripts() {
            info!("running {} ...", path.display());
            match script::run_script(conn, &path) {
                ScriptOutcome::Success => scripts_run += 1,
                ScriptOutcome::Failure(reason) => {
                    error!("aborting pipeline: script {} failed", path.display());
                    return Err(PipelineError::ScriptFailed { path, reason });
                }
            }
        }

        info!("rendering charts ...");
        report::render_charts(conn, &self.config.output_dir)?;

        info!("exporting spreadsheet ...");
        report::export_spreadsheet(conn, &self.config.output_dir)?;

        Ok(RunSummary {
            scripts_run,
            elapsed: start.elapsed(),
        })
    }
}
