use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use sales_dashboard::{import_sales, parse_sales_csv};

/// A utility for loading a `;` separated sales report into the sales database.
///
/// The existing sales in the database are replaced.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path of the CSV sales report.
    #[arg(long, short)]
    csv_path: String,

    /// File path of the SQLite database, created if it does not exist.
    #[arg(long, short)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let csv_path = Path::new(&args.csv_path);

    if !csv_path.is_file() {
        eprintln!("Could not find a CSV file at {csv_path:#?}");
        exit(1);
    }

    println!("Reading sales from {csv_path:#?}");
    let text = fs::read_to_string(csv_path)?;
    let parsed = parse_sales_csv(&text)?;

    println!("Importing into {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    let summary = import_sales(&parsed, &conn)?;

    println!(
        "Imported {} sales, skipped {} rows without a readable date or amount.",
        summary.imported, summary.skipped
    );

    Ok(())
}
