use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::error;
use salesduck::config::PipelineConfig;
use salesduck::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// DuckDB database file
    #[arg(long, default_value = "sales.duckdb")]
    db_path: PathBuf,

    /// Directory holding the generated parquet file
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory holding the SQL script units
    #[arg(long, default_value = "scripts")]
    scripts_dir: PathBuf,

    /// Directory the charts and the spreadsheet are written to
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = PipelineConfig {
        db_path: args.db_path,
        data_dir: args.data_dir,
        scripts_dir: args.scripts_dir,
        output_dir: args.output_dir,
    };
    match Pipeline::new(config).run() {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("pipeline failed: {}", e);
            Err(Box::new(e))
        }
    }
}
