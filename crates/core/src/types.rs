/// All primary keys are UUIDv7, generated by the application.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh, time-ordered primary key.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
