//! End-to-end behavior of the client handle over an in-memory SQLite pool.

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqliteQueryResult;
use tether_common_config::RuntimeMode;
use tether_database::{
    connect_sqlite, single_row_shape, Client, ClientOptions, ClientRegistry, DatabasePool,
    PoolConfig, PoolError, ShutdownHandler, ShutdownOutcome, ShutdownTrigger,
};
use tether_test_utils::{assert_err, assert_ok, LogCapture};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
struct Note {
    id: i64,
    title: String,
}

single_row_shape!(Note);

async fn seeded(mode: RuntimeMode) -> Client<DatabasePool> {
    let client = assert_ok!(connect_sqlite(PoolConfig::in_memory(), ClientOptions::for_mode(mode)).await);

    let _: SqliteQueryResult = assert_ok!(
        client
            .model("note")
            .run("create_table", |db| async move {
                sqlx::query("CREATE TABLE note (id INTEGER PRIMARY KEY, title TEXT NOT NULL)")
                    .execute(db.pool())
                    .await
            })
            .await
    );

    for title in ["alpha", "beta", "gamma"] {
        let _: SqliteQueryResult = assert_ok!(
            client
                .model("note")
                .run("create", |db| async move {
                    sqlx::query("INSERT INTO note (title) VALUES (?)")
                        .bind(title)
                        .execute(db.pool())
                        .await
                })
                .await
        );
    }

    client
}

#[tokio::test]
async fn rows_come_back_unchanged_and_are_logged_with_size_hints() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let client = seeded(RuntimeMode::Development).await;

    let notes: Vec<Note> = assert_ok!(
        client
            .model("note")
            .run("find_many", |db| async move {
                sqlx::query_as::<_, Note>("SELECT id, title FROM note ORDER BY id")
                    .fetch_all(db.pool())
                    .await
            })
            .await
    );
    assert_eq!(
        notes,
        vec![
            Note { id: 1, title: "alpha".into() },
            Note { id: 2, title: "beta".into() },
            Note { id: 3, title: "gamma".into() },
        ]
    );

    let note: Note = assert_ok!(
        client
            .model("note")
            .run("find_unique", |db| async move {
                sqlx::query_as::<_, Note>("SELECT id, title FROM note WHERE id = ?")
                    .bind(2_i64)
                    .fetch_one(db.pool())
                    .await
            })
            .await
    );
    assert_eq!(note.title, "beta");

    let missing: Option<Note> = assert_ok!(
        client
            .model("note")
            .run("find_first", |db| async move {
                sqlx::query_as::<_, Note>("SELECT id, title FROM note WHERE id = ?")
                    .bind(99_i64)
                    .fetch_optional(db.pool())
                    .await
            })
            .await
    );
    assert!(missing.is_none());

    let many = capture.lines_containing("note.find_many took");
    assert_eq!(many.len(), 1);
    assert!(many[0].contains("(3 items)"));

    let one = capture.lines_containing("note.find_unique took");
    assert_eq!(one.len(), 1);
    assert!(one[0].contains("(1 item)"));

    let none = capture.lines_containing("note.find_first took");
    assert_eq!(none.len(), 1);
    assert!(!none[0].contains("item"));
}

#[tokio::test]
async fn database_errors_pass_through_untouched() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let client = seeded(RuntimeMode::Production).await;

    let err = assert_err!(
        client
            .model("user")
            .run("find_many", |db| async move {
                sqlx::query_as::<_, Note>("SELECT id, title FROM user_account")
                    .fetch_all(db.pool())
                    .await
            })
            .await
    );

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.message().contains("no such table")),
        other => panic!("expected a database error, got {other:?}"),
    }

    let failures = capture.lines_containing("user.find_many failed after");
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("ERROR"));
    assert!(failures[0].contains("no such table"));
}

#[tokio::test]
async fn production_logs_no_success_lines() {
    let capture = LogCapture::new();
    let _guard = capture.set_default();
    let client = seeded(RuntimeMode::Production).await;

    let count: i64 = assert_ok!(
        client
            .model("note")
            .run("count", |db| async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM note").fetch_one(db.pool()).await
            })
            .await
    );

    assert_eq!(count, 3);
    assert!(capture.lines_containing(" took ").is_empty());
}

#[tokio::test]
async fn development_registry_hands_out_one_pool() {
    let registry = ClientRegistry::new();
    let options = ClientOptions::for_mode(RuntimeMode::Development);

    let first = assert_ok!(
        registry
            .get_or_init(options.clone(), |o| connect_sqlite(PoolConfig::in_memory(), o))
            .await
    );
    let second = assert_ok!(
        registry
            .get_or_init(options, |o| connect_sqlite(PoolConfig::in_memory(), o))
            .await
    );

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.backend(), second.backend()));
}

#[tokio::test]
async fn shutdown_closes_the_pool_and_tolerates_repeats() {
    let client = Arc::new(seeded(RuntimeMode::Development).await);
    let handler = ShutdownHandler::new(Arc::clone(&client));

    assert_eq!(handler.shutdown(ShutdownTrigger::Terminate).await, ShutdownOutcome::Disconnected);
    assert!(client.is_closed());

    assert_eq!(
        handler.shutdown(ShutdownTrigger::BeforeExit).await,
        ShutdownOutcome::AlreadyInProgress
    );
    assert_ok!(client.disconnect().await);

    // Calls after shutdown reach the closed pool and fail there.
    let after: Result<Vec<Note>, sqlx::Error> = client
        .model("note")
        .run("find_many", |db| async move {
            sqlx::query_as::<_, Note>("SELECT id, title FROM note").fetch_all(db.pool()).await
        })
        .await;
    assert!(matches!(after, Err(sqlx::Error::PoolClosed)));

    let health = client.health(Duration::from_secs(1)).await;
    assert!(!health.is_healthy);
}

#[tokio::test]
async fn invalid_pool_config_is_rejected_before_connecting() {
    let config = PoolConfig {
        max_connections: 0,
        ..PoolConfig::in_memory()
    };
    let err = assert_err!(connect_sqlite(config, ClientOptions::default()).await);
    assert!(matches!(err, PoolError::InvalidConfig(_)));
}
