use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use salesduck::generator::SalesGenerator;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Random seed for the generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of sales records to generate
    #[arg(long, default_value_t = 99)]
    count: u32,

    /// Directory the parquet file is written to
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let gen = SalesGenerator {
        seed: args.seed,
        count: args.count,
        ..SalesGenerator::default()
    };
    let sales = gen.generate();
    let path = args.data_dir.join("sales_2024.parquet");
    gen.write_parquet(&sales, &path)?;
    info!(
        "generated {} sales records at {}",
        sales.len(),
        path.display()
    );

    Ok(())
}
