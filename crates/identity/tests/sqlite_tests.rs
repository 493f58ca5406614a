//! Identity store behaviour over the SQLite backend, where uniqueness comes
//! out of real engine indexes instead of the in-memory scan.

use std::sync::Arc;

use sqlx::Row;
use tempfile::TempDir;

use gatehouse_config::{IdentityConfig, StorageConfig};
use gatehouse_identity::{provision, SessionStore, User, UserError, UserStore};
use gatehouse_store::{DocumentStore, SqliteStore};

async fn create_test_stores() -> (Arc<SqliteStore>, UserStore, SessionStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("identity.db");
    let storage = StorageConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: 5,
    };
    let config = IdentityConfig::default();

    let store = Arc::new(SqliteStore::connect(&storage).await.unwrap());
    provision(store.as_ref(), &config).await.unwrap();

    let client: Arc<dyn DocumentStore> = store.clone();
    let users = UserStore::from_config(client.clone(), &config);
    let sessions = SessionStore::from_config(client, &config);
    (store, users, sessions, temp_dir)
}

async fn count_sessions(store: &SqliteStore, user_id: &str) -> i64 {
    sqlx::query(
        "SELECT COUNT(*) AS count FROM documents
         WHERE collection = 'sessions' AND json_extract(doc, '$.user_id') = ?1",
    )
    .bind(user_id)
    .fetch_one(store.pool())
    .await
    .unwrap()
    .try_get("count")
    .unwrap()
}

#[tokio::test]
async fn registration_conflicts_come_from_the_engine_index() {
    let (_store, users, _sessions, _temp_dir) = create_test_stores().await;

    let user = User::new("alice@example.com");
    users.create_user(&user).await.unwrap();

    let result = users.create_user(&user).await;
    assert!(matches!(result, Err(UserError::DuplicateIdentity)));
}

#[tokio::test]
async fn login_rotation_scenario() {
    let (store, users, sessions, _temp_dir) = create_test_stores().await;

    users
        .create_user(&User::new("alice@example.com"))
        .await
        .unwrap();

    sessions.create_session("u1", "abc").await.unwrap();
    assert_eq!(sessions.get_session("u1").await.unwrap().unwrap().jwt, "abc");

    sessions.create_session("u1", "xyz").await.unwrap();
    assert_eq!(sessions.get_session("u1").await.unwrap().unwrap().jwt, "xyz");

    assert_eq!(count_sessions(&store, "u1").await, 1);
}

#[tokio::test]
async fn delete_user_cascades_to_the_session() {
    let (store, users, sessions, _temp_dir) = create_test_stores().await;

    users
        .create_user(&User::new("alice@example.com"))
        .await
        .unwrap();
    sessions
        .create_session("alice@example.com", "abc")
        .await
        .unwrap();

    users
        .delete_user("alice@example.com", &sessions)
        .await
        .unwrap();

    assert!(users
        .find_user_by_email("alice@example.com")
        .await
        .unwrap()
        .is_none());
    assert_eq!(count_sessions(&store, "alice@example.com").await, 0);
}

#[tokio::test]
async fn sessions_for_distinct_users_do_not_interfere() {
    let (store, _users, sessions, _temp_dir) = create_test_stores().await;

    sessions.create_session("u1", "abc").await.unwrap();
    sessions.create_session("u2", "def").await.unwrap();

    sessions.delete_sessions("u1").await.unwrap();

    assert!(sessions.get_session("u1").await.unwrap().is_none());
    assert_eq!(sessions.get_session("u2").await.unwrap().unwrap().jwt, "def");
    assert_eq!(count_sessions(&store, "u2").await, 1);
}
