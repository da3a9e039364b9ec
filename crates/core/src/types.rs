/// All database primary keys are UUIDs generated by PostgreSQL.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a movie or TV show in The Movie Database.
pub type TmdbId = i32;
