use anyhow::Result;
use rusqlite::{OptionalExtension, Row};

use crate::Database;
use crate::models::MessageRow;

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, title, content, category, priority, timestamp, is_read";

impl Database {
    /// Insert a message and return its assigned id. Timestamp and read
    /// state come from the schema defaults.
    pub fn insert_message(
        &self,
        sender_id: &str,
        receiver_id: &str,
        title: &str,
        content: &str,
        category: Option<&str>,
        priority: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender_id, receiver_id, title, content, category, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![sender_id, receiver_id, title, content, category, priority],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All messages, newest first, with optional category/priority filters.
    /// Timestamps have one-second resolution so id breaks ties.
    pub fn list_messages(
        &self,
        category: Option<&str>,
        priority: Option<&str>,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {} FROM messages", MESSAGE_COLUMNS);
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            if let Some(c) = &category {
                clauses.push("category = ?");
                params.push(c);
            }
            if let Some(p) = &priority {
                clauses.push("priority = ?");
                params.push(p);
            }
            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY timestamp DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params.as_slice(), row_to_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Unread messages addressed to `receiver_id`, newest first. The
    /// receiver is matched literally: broadcast rows carry the sentinel
    /// receiver and only show up when queried by it.
    pub fn list_unread(&self, receiver_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM messages
                 WHERE receiver_id = ?1 AND is_read = 0
                 ORDER BY timestamp DESC, id DESC",
                MESSAGE_COLUMNS
            ))?;

            let rows = stmt
                .query_map([receiver_id], row_to_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS),
                    [id],
                    row_to_message,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns false if no such row. Marking an already-read message again
    /// is a plain overwrite; the flag never goes back to unread.
    pub fn mark_read(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }

    /// Returns false if no such row.
    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

fn row_to_message(row: &Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        receiver_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        category: row.get(5)?,
        priority: row.get(6)?,
        timestamp: row.get(7)?,
        is_read: row.get(8)?,
    })
}
