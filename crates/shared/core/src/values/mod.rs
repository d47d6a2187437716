use chrono::{DateTime, Utc};

/// Day index within a quarter or within the whole run
pub type Day = usize;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Seed price every market history starts from
pub const DEFAULT_PRICE: f64 = 100.0;
