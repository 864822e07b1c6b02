use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (messages table)");
        conn.execute_batch(
            "
            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id   TEXT NOT NULL,
                receiver_id TEXT NOT NULL,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                category    TEXT,
                priority    TEXT,
                timestamp   TEXT NOT NULL DEFAULT (datetime('now')),
                is_read     INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_messages_receiver_unread
                ON messages(receiver_id, is_read);

            CREATE INDEX idx_messages_timestamp
                ON messages(timestamp);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}
