//! Command-line front end for eda-lens.
//!
//! ```text
//! eda [FILE.csv] [--dir DIR] [--json]
//! ```
//!
//! Without a file the datasets found in the data directory are listed. With a
//! file the table is loaded and its shape, a preview and a report for every
//! column are printed.

use std::path::PathBuf;

use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use eda_lens::formatters::{HumanFormatter, JsonFormatter};
use eda_lens::logging::setup::{init_logging, LoggingConfig};
use eda_lens::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to analyse; without one the data directory is listed
    file: Option<PathBuf>,

    /// Directory searched for CSV datasets
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Print the column reports as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(LoggingConfig::default())?;

    let mut builder = EdaConfig::builder();
    if let Some(dir) = &args.dir {
        builder = builder.data_dir(dir);
    }
    let eda = AnalysisOrchestrator::new(builder.build()?)?;

    let Some(file) = args.file else {
        let datasets = eda.discover_datasets()?;
        if datasets.is_empty() {
            println!("No CSV files in {}", eda.config().data_dir.display());
        }
        for path in datasets {
            println!("{}", path.display());
        }
        return Ok(());
    };

    let info = match eda.load_path(&file).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let reports = eda.column_reports()?;
    if args.json {
        println!("{}", JsonFormatter::new().format_all(&reports)?);
        return Ok(());
    }

    println!("Successfully loaded dataset: {info}\n");
    let preview = eda.preview(None).await?;
    println!("{}\n", pretty_format_batches(&[preview])?);
    print!("{}", HumanFormatter::new().format_all(&reports)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_file_dir_and_json() {
        let args =
            Args::try_parse_from(["eda", "measles.csv", "--dir", "data", "--json"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("measles.csv")));
        assert_eq!(args.dir, Some(PathBuf::from("data")));
        assert!(args.json);

        let listing = Args::try_parse_from(["eda"]).unwrap();
        assert!(listing.file.is_none());
        assert!(!listing.json);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(Args::try_parse_from(["eda", "--dir"]).is_err());
        assert!(Args::try_parse_from(["eda", "--verbose"]).is_err());
        assert!(Args::try_parse_from(["eda", "a.csv", "b.csv"]).is_err());
    }
}
