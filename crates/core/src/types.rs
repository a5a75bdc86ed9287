/// Entity identifiers are opaque strings (ObjectId-style or UUID text).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, time-ordered entity id (UUID v7, simple format).
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::now_v7().simple().to_string()
}
