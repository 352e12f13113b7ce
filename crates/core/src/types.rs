/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (planned inspection periods) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Wire and storage format for [`Date`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
