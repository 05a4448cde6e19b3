//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, sale::Channel};

/// The sales channels offered in the dashboard filter when none are configured.
pub const DEFAULT_CHANNELS: [&str; 3] = ["Shopee", "Tokopedia", "TikTok"];

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The display names of the sales channels to offer in the dashboard filter.
    pub channels: Vec<String>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the sales table
    /// if it does not exist. Blank and duplicate channel names (ignoring case)
    /// are dropped, as is "all" since it always selects every channel.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, channels: &[String]) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let mut unique_channels: Vec<String> = Vec::with_capacity(channels.len());
        for channel in channels {
            let name = channel.trim();
            let is_duplicate = unique_channels
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(name));

            if Channel::parse(name) != Channel::All && !is_duplicate {
                unique_channels.push(name.to_owned());
            }
        }

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            channels: unique_channels,
        })
    }
}
