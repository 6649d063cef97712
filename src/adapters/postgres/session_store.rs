//! PostgreSQL implementation of SessionStore.
//!
//! Every mutating operation runs in one transaction. Returning early with
//! `?` drops the transaction, which rolls it back; commit is the last step.
//!
//! The one-active-session rule rests on the partial unique index
//! `study_sessions_one_active_per_user`. The in-transaction check gives the
//! friendly error in the common case; the index catches the race where two
//! creates both see no active row.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::mapping::{EventRow, StudySessionRow};
use crate::domain::foundation::{SessionId, SessionState, UserId};
use crate::domain::study_session::{NewSessionEvent, SessionEvent, StudySession};
use crate::ports::{SessionStore, SessionStoreError};

/// Name of the partial unique index enforcing one active session per user.
const ACTIVE_SESSION_INDEX: &str = "study_sessions_one_active_per_user";

/// Rows per multi-row event insert, well under the bind parameter limit.
const EVENT_INSERT_CHUNK: usize = 1_000;

/// Session columns plus the timeline and subjects as JSON text.
const AGGREGATE_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.title, s.notes, s.date, s.session_state,
           s.created_at, s.updated_at,
           (
               SELECT json_agg(json_build_object(
                          'id', e.id,
                          'session_id', e.session_id,
                          'event_type', e.event_type,
                          'event_time', e.event_time,
                          'description', e.description,
                          'device_info', e.device_info
                      ) ORDER BY e.event_time, e.seq)::text
               FROM session_events e
               WHERE e.session_id = s.id
           ) AS events,
           (
               SELECT json_agg(json_build_object(
                          'id', sub.id,
                          'user_id', sub.user_id,
                          'name', sub.name,
                          'description', sub.description,
                          'created_at', sub.created_at,
                          'updated_at', sub.updated_at
                      ) ORDER BY sub.name)::text
               FROM session_subjects ss
               JOIN subjects sub ON sub.id = ss.subject_id
               WHERE ss.session_id = s.id
           ) AS subjects
    FROM study_sessions s
"#;

/// PostgreSQL implementation of SessionStore.
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Creates a new PostgresSessionStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create_session(
        &self,
        session: &StudySession,
    ) -> Result<StudySession, SessionStoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM study_sessions
            WHERE user_id = $1 AND session_state = 'active'
            FOR UPDATE
            "#,
        )
        .bind(session.user_id().as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("check active session"))?;

        if existing.is_some() {
            tracing::debug!(user_id = %session.user_id(), "active session already present");
            return Err(SessionStoreError::ActiveSessionExists);
        }

        sqlx::query(
            r#"
            INSERT INTO study_sessions (
                id, user_id, title, notes, date, session_state, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_str())
        .bind(session.title())
        .bind(session.notes())
        .bind(session.date().as_datetime())
        .bind(SessionState::Active.as_str())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_active_session_conflict(&e) {
                tracing::debug!(
                    user_id = %session.user_id(),
                    "lost race for active session slot"
                );
                SessionStoreError::ActiveSessionExists
            } else {
                db_error("insert session")(e)
            }
        })?;

        insert_events(&mut tx, session.events()).await?;

        let created = load_session(&mut tx, session.id())
            .await?
            .ok_or(SessionStoreError::NotFound(*session.id()))?;

        tx.commit().await.map_err(db_error("commit session"))?;

        tracing::debug!(session_id = %session.id(), "session row created");
        Ok(created)
    }

    async fn get_active_session(
        &self,
        user_id: &UserId,
    ) -> Result<StudySession, SessionStoreError> {
        let sql = format!("{} WHERE s.user_id = $1 AND s.session_state = 'active'", AGGREGATE_SELECT);
        let row: Option<StudySessionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("fetch active session"))?;

        match row {
            Some(row) => row.into_session(),
            None => Err(SessionStoreError::ActiveSessionNotFound),
        }
    }

    async fn get_session_by_id(
        &self,
        session_id: &SessionId,
    ) -> Result<StudySession, SessionStoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        load_session(&mut conn, session_id)
            .await?
            .ok_or(SessionStoreError::NotFound(*session_id))
    }

    async fn append_active_events(
        &self,
        user_id: &UserId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let locked: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM study_sessions
            WHERE user_id = $1 AND session_state = 'active'
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("lock active session"))?;

        let session_id = locked
            .map(SessionId::from_uuid)
            .ok_or(SessionStoreError::ActiveSessionNotFound)?;

        let timeline = append_locked(&mut tx, &session_id, events).await?;
        tx.commit().await.map_err(db_error("commit events"))?;
        Ok(timeline)
    }

    async fn append_session_events(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        events: &[NewSessionEvent],
    ) -> Result<Vec<SessionEvent>, SessionStoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let locked: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT user_id, session_state FROM study_sessions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("lock session"))?;

        match locked {
            Some((owner, _)) if owner != user_id.as_str() => {
                return Err(SessionStoreError::NotFound(*session_id));
            }
            Some((_, state)) if state != SessionState::Active.as_str() => {
                return Err(SessionStoreError::ActiveSessionNotFound);
            }
            Some(_) => {}
            None => return Err(SessionStoreError::NotFound(*session_id)),
        }

        let timeline = append_locked(&mut tx, session_id, events).await?;
        tx.commit().await.map_err(db_error("commit events"))?;
        Ok(timeline)
    }

    async fn finish_session(
        &self,
        user_id: &UserId,
        stop_event: &NewSessionEvent,
    ) -> Result<StudySession, SessionStoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let finished: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE study_sessions
            SET session_state = 'completed', updated_at = NOW()
            WHERE user_id = $1 AND session_state = 'active'
            RETURNING id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("complete session"))?;

        let session_id = finished
            .map(SessionId::from_uuid)
            .ok_or(SessionStoreError::ActiveSessionNotFound)?;

        let stop = stop_event.clone().record(session_id);
        insert_events(&mut tx, std::slice::from_ref(&stop)).await?;

        let session = load_session(&mut tx, &session_id)
            .await?
            .ok_or(SessionStoreError::NotFound(session_id))?;

        tx.commit().await.map_err(db_error("commit finish"))?;
        Ok(session)
    }

    async fn list_sessions(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<StudySession>, SessionStoreError> {
        let sql = format!(
            "{} WHERE s.user_id = $1 ORDER BY s.date DESC, s.created_at DESC",
            AGGREGATE_SELECT
        );
        let rows: Vec<StudySessionRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list sessions"))?;

        rows.into_iter().map(StudySessionRow::into_session).collect()
    }

    async fn ping(&self) -> Result<(), SessionStoreError> {
        super::pool::health_check(&self.pool)
            .await
            .map_err(db_error("ping database"))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

/// Inserts events for a session already locked by the caller, then returns
/// the full ordered timeline.
async fn append_locked(
    conn: &mut PgConnection,
    session_id: &SessionId,
    events: &[NewSessionEvent],
) -> Result<Vec<SessionEvent>, SessionStoreError> {
    if !events.is_empty() {
        let recorded: Vec<SessionEvent> = events
            .iter()
            .cloned()
            .map(|e| e.record(*session_id))
            .collect();
        insert_events(&mut *conn, &recorded).await?;

        sqlx::query("UPDATE study_sessions SET updated_at = NOW() WHERE id = $1")
            .bind(session_id.as_uuid())
            .execute(&mut *conn)
            .await
            .map_err(db_error("touch session"))?;

        tracing::debug!(
            session_id = %session_id,
            event_count = recorded.len(),
            "events appended"
        );
    }

    load_events(conn, session_id).await
}

/// Parameterized multi-row insert of recorded events.
async fn insert_events(
    conn: &mut PgConnection,
    events: &[SessionEvent],
) -> Result<(), SessionStoreError> {
    for chunk in events.chunks(EVENT_INSERT_CHUNK) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO session_events \
             (id, session_id, event_type, event_time, description, device_info) ",
        );
        builder.push_values(chunk, |mut row, event| {
            row.push_bind(*event.id().as_uuid())
                .push_bind(*event.session_id().as_uuid())
                .push_bind(event.event_type().as_str())
                .push_bind(*event.event_time().as_datetime())
                .push_bind(event.description().map(str::to_owned))
                .push_bind(event.device_info().map(str::to_owned));
        });

        builder
            .build()
            .execute(&mut *conn)
            .await
            .map_err(db_error("insert events"))?;
    }
    Ok(())
}

async fn load_session(
    conn: &mut PgConnection,
    session_id: &SessionId,
) -> Result<Option<StudySession>, SessionStoreError> {
    let sql = format!("{} WHERE s.id = $1", AGGREGATE_SELECT);
    let row: Option<StudySessionRow> = sqlx::query_as(&sql)
        .bind(session_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("fetch session"))?;

    row.map(StudySessionRow::into_session).transpose()
}

async fn load_events(
    conn: &mut PgConnection,
    session_id: &SessionId,
) -> Result<Vec<SessionEvent>, SessionStoreError> {
    let rows: Vec<EventRow> = sqlx::query_as(
        r#"
        SELECT id, session_id, event_type, event_time, description, device_info
        FROM session_events
        WHERE session_id = $1
        ORDER BY event_time, seq
        "#,
    )
    .bind(session_id.as_uuid())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("fetch events"))?;

    rows.into_iter().map(EventRow::into_event).collect()
}

/// True if the error is the active-session unique index firing.
fn is_active_session_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(ACTIVE_SESSION_INDEX),
        _ => false,
    }
}

fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> SessionStoreError {
    move |e| SessionStoreError::Database(format!("Failed to {}: {}", action, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_error_names_the_action() {
        let err = db_error("insert session")(sqlx::Error::RowNotFound);
        assert!(matches!(
            err,
            SessionStoreError::Database(msg) if msg.starts_with("Failed to insert session")
        ));
    }

    #[test]
    fn non_database_errors_are_not_conflicts() {
        assert!(!is_active_session_conflict(&sqlx::Error::RowNotFound));
        assert!(!is_active_session_conflict(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn aggregate_select_orders_timeline_by_time_then_insertion() {
        assert!(AGGREGATE_SELECT.contains("ORDER BY e.event_time, e.seq"));
    }
}
