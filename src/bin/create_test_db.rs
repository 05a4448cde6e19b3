use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month};

use sales_dashboard::{DEFAULT_CHANNELS, SaleRecord, SaleStatus, create_sale, initialize_db};

const PRODUCTS: [(&str, f64); 5] = [
    ("Kaos Polos", 85_000.0),
    ("Kemeja Flanel", 175_000.0),
    ("Hijab Segi Empat", 45_000.0),
    ("Tas Selempang", 220_000.0),
    ("Topi Baseball", 60_000.0),
];

/// A utility for creating a test database for the sales dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The year to create sales for.
    #[arg(long, short, default_value_t = 2024)]
    year: i32,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test sales for {}...", args.year);

    let tx = conn.unchecked_transaction()?;
    let first_day = Date::from_calendar_date(args.year, Month::January, 1)?;
    let mut sale_count = 0;
    let mut day = first_day;

    while day.year() == args.year {
        let ordinal = usize::from(day.ordinal());

        // Two to four sales a day, cycling through the products and channels.
        for i in 0..(2 + ordinal % 3) {
            let (product, price) = PRODUCTS[(ordinal + i) % PRODUCTS.len()];
            let channel = DEFAULT_CHANNELS[(ordinal * 7 + i) % DEFAULT_CHANNELS.len()];
            let quantity = 1 + ((ordinal + i * 5) % 4) as u32;
            let status = if (ordinal + i) % 17 == 0 {
                SaleStatus::Return
            } else {
                SaleStatus::Completed
            };

            let sale = SaleRecord::new(
                &format!("{day} {:02}:{:02}:00", 8 + i * 3, (ordinal * 13) % 60),
                price * f64::from(quantity),
            )
            .quantity(quantity)
            .product(product)
            .status(status)
            .channel(channel);

            create_sale(&sale, &tx)?;
            sale_count += 1;
        }

        day += Duration::days(1);
    }

    tx.commit()?;

    println!("Created {sale_count} sales.");
    println!("Success!");

    Ok(())
}
