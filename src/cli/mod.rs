//! Command-line interface for churn-prep

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::TransformationConfig;
use crate::transformation::DataTransformation;
use crate::utils::DataLoader;

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

#[derive(Parser)]
#[command(name = "churn-prep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Column-wise preprocessing for customer churn data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit on the train split, transform both splits, persist the artifact
    Transform {
        /// Training data CSV
        #[arg(short, long)]
        train: PathBuf,

        /// Test data CSV
        #[arg(short = 'e', long)]
        test: PathBuf,

        /// Target column name
        #[arg(long, default_value = "customer_status")]
        target: String,

        /// Where to write the fitted preprocessor
        #[arg(short, long)]
        artifact: Option<PathBuf>,
    },

    /// Show shape and dtypes of a data file
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn cmd_transform(
    train: &PathBuf,
    test: &PathBuf,
    target: &str,
    artifact: Option<&PathBuf>,
) -> anyhow::Result<()> {
    section("Transform");

    let mut config = TransformationConfig::default().with_target_column(target);
    if let Some(path) = artifact {
        config = config.with_artifact_path(path.clone());
    }

    let start = Instant::now();
    let runner = DataTransformation::new(config);
    let (train_matrix, test_matrix, artifact_path) = runner.run(train, test)?;

    step_ok(&format!(
        "train matrix {} × {}",
        train_matrix.nrows(),
        train_matrix.ncols()
    ));
    step_ok(&format!(
        "test matrix  {} × {}",
        test_matrix.nrows(),
        test_matrix.ncols()
    ));
    step_ok(&format!(
        "artifact     {} {}",
        artifact_path.display(),
        dim(&format!("({:?})", start.elapsed()))
    ));
    println!();

    Ok(())
}

pub fn cmd_info(data: &PathBuf) -> anyhow::Result<()> {
    section("Info");

    let df = DataLoader::new().load_auto(data)?;
    println!("  {:<12} {}", dim("rows"), df.height());
    println!("  {:<12} {}", dim("columns"), df.width());
    println!();

    for (name, dtype) in df.get_column_names().iter().zip(df.dtypes().iter()) {
        println!("  {:<36} {}", name.to_string(), dim(&dtype.to_string()));
    }
    println!();

    Ok(())
}
