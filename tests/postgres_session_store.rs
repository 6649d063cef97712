//! PostgreSQL session store tests.
//!
//! Each test gets a fresh database with the migrations applied. They need a
//! running server: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use futures::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;

use study_sessions::adapters::PostgresSessionStore;
use study_sessions::domain::foundation::{SessionId, SessionState, Timestamp, UserId};
use study_sessions::domain::study_session::{
    EventType, NewSessionEvent, SessionEvent, StudySession,
};
use study_sessions::ports::{SessionStore, SessionStoreError};

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn new_session(user_id: &UserId, title: &str, at: Timestamp) -> StudySession {
    StudySession::start(SessionId::new(), user_id.clone(), title, "notes", at).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_then_read_back_aggregate(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let alice = user("alice");
    let session = new_session(&alice, "Thermodynamics", Timestamp::now());

    let created = store.create_session(&session).await.unwrap();
    let active = store.get_active_session(&alice).await.unwrap();

    assert_eq!(created.id(), session.id());
    assert_eq!(active.id(), session.id());
    assert_eq!(active.title(), "Thermodynamics");
    assert_eq!(active.notes(), "notes");
    assert_eq!(active.state(), SessionState::Active);
    assert_eq!(active.events().len(), 1);
    assert_eq!(active.events()[0].event_type(), EventType::Start);
    assert!(active.subjects().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_creates_admit_exactly_one(pool: PgPool) {
    let store = Arc::new(PostgresSessionStore::new(pool));
    let alice = user("alice");

    let attempts = (0..8).map(|i| {
        let store = store.clone();
        let session = new_session(&alice, &format!("Attempt {}", i), Timestamp::now());
        tokio::spawn(async move { store.create_session(&session).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == SessionStoreError::ActiveSessionExists));
    assert_eq!(store.list_sessions(&alice).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn failed_create_leaves_no_active_session(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let t0 = Timestamp::now();
    let bobs = new_session(&user("bob"), "Bob's", t0);
    store.create_session(&bobs).await.unwrap();

    // Start event reuses Bob's event id, so the event insert fails after
    // the session row is already written.
    let alice = user("alice");
    let id = SessionId::new();
    let clashing_start = SessionEvent::reconstitute(
        *bobs.events()[0].id(),
        id,
        EventType::Start,
        t0,
        None,
        None,
    );
    let doomed = StudySession::reconstitute(
        id,
        alice.clone(),
        "Doomed".into(),
        String::new(),
        t0,
        SessionState::Active,
        vec![clashing_start],
        Vec::new(),
        t0,
        t0,
    );

    assert!(matches!(
        store.create_session(&doomed).await,
        Err(SessionStoreError::Database(_))
    ));
    assert_eq!(
        store.get_active_session(&alice).await.unwrap_err(),
        SessionStoreError::ActiveSessionNotFound
    );
    assert_eq!(
        store.get_session_by_id(&id).await.unwrap_err(),
        SessionStoreError::NotFound(id)
    );
    store
        .create_session(&new_session(&alice, "Retry", t0))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn append_orders_by_time_then_insertion(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let alice = user("alice");
    let t0 = Timestamp::now();
    store
        .create_session(&new_session(&alice, "Optics", t0))
        .await
        .unwrap();

    let events = store
        .append_active_events(
            &alice,
            &[
                NewSessionEvent::new(EventType::Resume, t0.plus_secs(20)),
                NewSessionEvent::new(EventType::Pause, t0.plus_secs(10)),
                NewSessionEvent::new(EventType::Pause, t0.plus_secs(20))
                    .with_description("same instant"),
            ],
        )
        .await
        .unwrap();

    let kinds: Vec<EventType> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        kinds,
        vec![
            EventType::Start,
            EventType::Pause,
            EventType::Resume,
            EventType::Pause
        ]
    );
    assert_eq!(events[3].description(), Some("same instant"));

    let unchanged = store.append_active_events(&alice, &[]).await.unwrap();
    assert_eq!(unchanged, events);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn finish_is_terminal(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let alice = user("alice");
    let t0 = Timestamp::now();
    let session = new_session(&alice, "Genetics", t0);
    store.create_session(&session).await.unwrap();

    let finished = store
        .finish_session(&alice, &NewSessionEvent::stop(t0.plus_secs(60), None))
        .await
        .unwrap();
    assert_eq!(finished.state(), SessionState::Completed);
    assert_eq!(finished.events().last().unwrap().event_type(), EventType::Stop);

    let stop = NewSessionEvent::stop(t0.plus_secs(120), None);
    assert_eq!(
        store.finish_session(&alice, &stop).await.unwrap_err(),
        SessionStoreError::ActiveSessionNotFound
    );
    assert_eq!(
        store.get_active_session(&alice).await.unwrap_err(),
        SessionStoreError::ActiveSessionNotFound
    );
    assert_eq!(
        store
            .append_session_events(&alice, session.id(), &[stop])
            .await
            .unwrap_err(),
        SessionStoreError::ActiveSessionNotFound
    );

    // The completed session no longer blocks a new one.
    store
        .create_session(&new_session(&alice, "Genetics II", t0.plus_secs(300)))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_finishes_complete_once(pool: PgPool) {
    let store = Arc::new(PostgresSessionStore::new(pool));
    let alice = user("alice");
    let t0 = Timestamp::now();
    let session = new_session(&alice, "Statistics", t0);
    store.create_session(&session).await.unwrap();

    let attempts = (0..8).map(|i| {
        let store = store.clone();
        let alice = alice.clone();
        let stop = NewSessionEvent::stop(t0.plus_secs(60 + i), None);
        tokio::spawn(async move { store.finish_session(&alice, &stop).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == SessionStoreError::ActiveSessionNotFound));

    let stored = store.get_session_by_id(session.id()).await.unwrap();
    assert_eq!(stored.state(), SessionState::Completed);
    let stops = stored
        .events()
        .iter()
        .filter(|e| e.event_type() == EventType::Stop)
        .count();
    assert_eq!(stops, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn append_by_id_requires_ownership(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let bob = user("bob");
    let session = new_session(&bob, "Bob's", Timestamp::now());
    store.create_session(&session).await.unwrap();

    let err = store
        .append_session_events(
            &user("alice"),
            session.id(),
            &[NewSessionEvent::new(EventType::Pause, Timestamp::now())],
        )
        .await
        .unwrap_err();
    assert_eq!(err, SessionStoreError::NotFound(*session.id()));

    let missing = SessionId::new();
    assert_eq!(
        store.get_session_by_id(&missing).await.unwrap_err(),
        SessionStoreError::NotFound(missing)
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn linked_subjects_are_loaded(pool: PgPool) {
    let store = PostgresSessionStore::new(pool.clone());
    let alice = user("alice");
    let session = new_session(&alice, "Revision", Timestamp::now());
    store.create_session(&session).await.unwrap();

    let subject_id = Uuid::new_v4();
    sqlx::query("INSERT INTO subjects (id, user_id, name) VALUES ($1, $2, $3)")
        .bind(subject_id)
        .bind(alice.as_str())
        .bind("Mathematics")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO session_subjects (session_id, subject_id) VALUES ($1, $2)")
        .bind(session.id().as_uuid())
        .bind(subject_id)
        .execute(&pool)
        .await
        .unwrap();

    let loaded = store.get_session_by_id(session.id()).await.unwrap();
    assert_eq!(loaded.subjects().len(), 1);
    assert_eq!(loaded.subjects()[0].name(), "Mathematics");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn history_is_newest_first(pool: PgPool) {
    let store = PostgresSessionStore::new(pool);
    let alice = user("alice");
    let t0 = Timestamp::now();

    for (offset, title) in [(0, "Older"), (3600, "Newer")] {
        store
            .create_session(&new_session(&alice, title, t0.plus_secs(offset)))
            .await
            .unwrap();
        store
            .finish_session(
                &alice,
                &NewSessionEvent::stop(t0.plus_secs(offset + 60), None),
            )
            .await
            .unwrap();
    }

    let titles: Vec<String> = store
        .list_sessions(&alice)
        .await
        .unwrap()
        .iter()
        .map(|s| s.title().to_string())
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
    assert!(store.list_sessions(&user("bob")).await.unwrap().is_empty());
    store.ping().await.unwrap();
}
