use std::path::PathBuf;

/// Locations used by a pipeline run.  Every path is overridable; the
/// defaults mirror the layout the shipped scripts assume (a `data/`
/// directory next to `scripts/` and `output/`, database file in the
/// working directory).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            db_path: PathBuf::from("sales.duckdb"),
            data_dir: PathBuf::from("data"),
            scripts_dir: PathBuf::from("scripts"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PipelineConfig {
    /// Name of the parquet file the generator writes and the ingestion
    /// script reads.
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join("sales_2024.parquet")
    }
}
