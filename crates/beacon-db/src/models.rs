/// Raw SQLite rows. Kept separate from the beacon-types wire models so
/// the store stays independent of serde and the HTTP layer; the API crate
/// owns the row-to-wire conversion.
pub struct MessageRow {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    /// As stored by SQLite: "YYYY-MM-DD HH:MM:SS", UTC.
    pub timestamp: String,
    pub is_read: bool,
}
