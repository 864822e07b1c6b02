use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::warn;

use beacon_db::models::MessageRow;
use beacon_types::api::{
    CreateMessageResponse, SendMessageRequest, StatusResponse, ValidationDetails,
};
use beacon_types::models::{Category, Message, Priority};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// POST /api/messages: validate, insert, echo the assigned id.
pub async fn create_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut details = ValidationDetails::default();
    if req.sender_id.is_empty() {
        details.sender_id = Some("Sender ID is required".into());
    }
    if req.receiver_id.is_empty() {
        details.receiver_id = Some("Receiver ID is required".into());
    }
    if req.title.is_empty() {
        details.title = Some("Title is required".into());
    }
    if req.content.is_empty() {
        details.content = Some("Message content is required".into());
    }
    if !details.is_empty() {
        return Err(ApiError::missing_fields(details));
    }

    // category/priority come in as raw strings; only the known values are
    // allowed into storage
    let mut details = ValidationDetails::default();
    let category = match req.category.as_deref() {
        Some(raw) => match Category::parse(raw) {
            Some(c) => Some(c),
            None => {
                details.category = Some(format!("Unknown category: {}", raw));
                None
            }
        },
        None => None,
    };
    let priority = match req.priority.as_deref() {
        Some(raw) => match Priority::parse(raw) {
            Some(p) => Some(p),
            None => {
                details.priority = Some(format!("Unknown priority: {}", raw));
                None
            }
        },
        None => None,
    };
    if !details.is_empty() {
        return Err(ApiError::invalid_fields(details));
    }

    // Run the blocking rusqlite call off the async runtime
    let db = state.clone();
    let id = tokio::task::spawn_blocking(move || {
        db.db.insert_message(
            &req.sender_id,
            &req.receiver_id,
            &req.title,
            &req.content,
            category.map(|c| c.as_str()),
            priority.map(|p| p.as_str()),
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok((StatusCode::CREATED, Json(CreateMessageResponse { id })))
}

/// GET /api/messages: every message, newest first. Unknown filter values
/// simply match nothing; the stored values are canonical.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || {
        db.db
            .list_messages(query.category.as_deref(), query.priority.as_deref())
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(rows.into_iter().map(message_from_row).collect()))
}

/// GET /api/messages/{userId}/unread
pub async fn unread_messages(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_unread(&user_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    Ok(Json(rows.into_iter().map(message_from_row).collect()))
}

/// GET /api/messages/{messageId}
pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Json<Message>, ApiError> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_message(message_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    match row {
        Some(row) => Ok(Json(message_from_row(row))),
        None => Err(ApiError::NotFound),
    }
}

/// PUT /api/messages/{messageId}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let db = state.clone();
    let updated = tokio::task::spawn_blocking(move || db.db.mark_read(message_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    if !updated {
        return Err(ApiError::NotFound);
    }
    Ok(Json(StatusResponse { success: true }))
}

/// DELETE /api/messages/{messageId}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    let db = state.clone();
    let removed = tokio::task::spawn_blocking(move || db.db.delete_message(message_id))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    if !removed {
        return Err(ApiError::NotFound);
    }
    Ok(Json(StatusResponse { success: true }))
}

pub async fn health() -> &'static str {
    "OK"
}

fn message_from_row(row: MessageRow) -> Message {
    let category = row.category.as_deref().and_then(|raw| {
        let parsed = Category::parse(raw);
        if parsed.is_none() {
            warn!("Corrupt category '{}' on message {}", raw, row.id);
        }
        parsed
    });
    let priority = row.priority.as_deref().and_then(|raw| {
        let parsed = Priority::parse(raw);
        if parsed.is_none() {
            warn!("Corrupt priority '{}' on message {}", raw, row.id);
        }
        parsed
    });

    let timestamp = row
        .timestamp
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(&row.timestamp, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!(
                "Corrupt timestamp '{}' on message {}: {}",
                row.timestamp, row.id, e
            );
            chrono::DateTime::default()
        });

    Message {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        title: row.title,
        content: row.content,
        category,
        priority,
        timestamp,
        is_read: row.is_read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(timestamp: &str, category: Option<&str>) -> MessageRow {
        MessageRow {
            id: 7,
            sender_id: "a".into(),
            receiver_id: "b".into(),
            title: "T".into(),
            content: "C".into(),
            category: category.map(String::from),
            priority: None,
            timestamp: timestamp.into(),
            is_read: false,
        }
    }

    #[test]
    fn sqlite_timestamps_parse_as_utc() {
        let msg = message_from_row(row("2025-05-11 08:15:23", None));
        assert_eq!(msg.timestamp.to_rfc3339(), "2025-05-11T08:15:23+00:00");
    }

    #[test]
    fn rfc3339_timestamps_also_parse() {
        let msg = message_from_row(row("2025-05-11T08:15:23Z", None));
        assert_eq!(msg.timestamp.to_rfc3339(), "2025-05-11T08:15:23+00:00");
    }

    #[test]
    fn corrupt_optional_columns_become_none() {
        let msg = message_from_row(row("2025-05-11 08:15:23", Some("weather")));
        assert!(msg.category.is_none());

        let msg = message_from_row(row("2025-05-11 08:15:23", Some("evacuation")));
        assert_eq!(msg.category, Some(Category::Evacuation));
    }
}
