//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `careerpath-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reader for SELECTs and
//! writer for everything else.

use careerpath_core::chat::repository::ChatRepository;
use careerpath_types::chat::{ChatMessage, ChatSession, SessionOverview};
use careerpath_types::error::RepositoryError;
use careerpath_types::llm::MessageRole;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid, query_err};

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    user_id: String,
    title: String,
    topic: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            topic: row.try_get("topic")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        Ok(ChatSession {
            id: parse_uuid(&self.id, "session id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            title: self.title,
            topic: self.topic,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Message columns, optionally read under a prefix (for the joined
/// "last message" columns of the session listing).
struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
    model: Option<String>,
    input_tokens: Option<i64>,
    output_tokens: Option<i64>,
    response_ms: Option<i64>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow, prefix: &str) -> Result<Self, sqlx::Error> {
        let col = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            id: row.try_get(col("id").as_str())?,
            session_id: row.try_get(col("session_id").as_str())?,
            role: row.try_get(col("role").as_str())?,
            content: row.try_get(col("content").as_str())?,
            created_at: row.try_get(col("created_at").as_str())?,
            model: row.try_get(col("model").as_str())?,
            input_tokens: row.try_get(col("input_tokens").as_str())?,
            output_tokens: row.try_get(col("output_tokens").as_str())?,
            response_ms: row.try_get(col("response_ms").as_str())?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(ChatMessage {
            id: parse_uuid(&self.id, "message id")?,
            session_id: parse_uuid(&self.session_id, "session_id")?,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            model: self.model,
            input_tokens: self.input_tokens.map(|v| v as u32),
            output_tokens: self.output_tokens.map(|v| v as u32),
            response_ms: self.response_ms.map(|v| v as u64),
        })
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, title, topic, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(&session.title)
        .bind(&session.topic)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(query_err)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE chat_sessions SET title = ?, topic = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&session.title)
        .bind(&session.topic)
        .bind(format_datetime(&session.updated_at))
        .bind(session.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<SessionOverview>, RepositoryError> {
        // SQLite treats a negative LIMIT as "no limit".
        let rows = sqlx::query(
            r#"SELECT s.*,
                      m.id AS m_id, m.session_id AS m_session_id, m.role AS m_role,
                      m.content AS m_content, m.created_at AS m_created_at, m.model AS m_model,
                      m.input_tokens AS m_input_tokens, m.output_tokens AS m_output_tokens,
                      m.response_ms AS m_response_ms
               FROM chat_sessions s
               LEFT JOIN chat_messages m ON m.id = (
                   SELECT id FROM chat_messages
                   WHERE session_id = s.id
                   ORDER BY created_at DESC, rowid DESC
                   LIMIT 1
               )
               WHERE s.user_id = ?
               ORDER BY s.updated_at DESC, s.rowid DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(user_id.to_string())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut overviews = Vec::with_capacity(rows.len());
        for row in &rows {
            let session = ChatSessionRow::from_row(row)
                .map_err(query_err)?
                .into_session()?;
            let has_message: Option<String> = row.try_get("m_id").map_err(query_err)?;
            let last_message = match has_message {
                Some(_) => Some(
                    ChatMessageRow::from_row(row, "m_")
                        .map_err(query_err)?
                        .into_message()?,
                ),
                None => None,
            };
            overviews.push(SessionOverview {
                session,
                last_message,
            });
        }

        Ok(overviews)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        // Messages go with the session via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn save_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, created_at, model, input_tokens, output_tokens, response_ms)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .bind(&message.model)
        .bind(message.input_tokens.map(i64::from))
        .bind(message.output_tokens.map(i64::from))
        .bind(message.response_ms.map(|v| v as i64))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_messages WHERE session_id = ?
               ORDER BY created_at ASC, rowid ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(session_id.to_string())
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row, "").map_err(query_err)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM chat_messages WHERE session_id = ?")
                .bind(session_id.to_string())
                .fetch_one(&self.pool.reader)
                .await
                .map_err(query_err)?;

        Ok(count as u32)
    }

    async fn count_sessions(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;

        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;

        Ok(count as u64)
    }
}
