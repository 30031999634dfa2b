// Integration tests for the PostgreSQL config repository.
// Requires a database with the hstore extension available:
//   DATABASE_URL=postgres://... cargo test -- --ignored

use platform_config::{
    AppRef, ConfigError, ConfigRepository, ConfigStore, NewConfig, Patch, PostgresConfigRepository,
    Vars,
};
use std::sync::Arc;
use uuid::Uuid;

async fn connect() -> PostgresConfigRepository {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    PostgresConfigRepository::connect(&database_url, 5)
        .await
        .expect("Failed to connect to PostgreSQL")
}

// Unique per run so tests do not see each other's history
fn unique_app(prefix: &str) -> AppRef {
    AppRef::new(format!("{}-{}", prefix, Uuid::new_v4())).unwrap()
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_postgres_insert_find_and_conflict() {
    let repo = connect().await;
    let app = unique_app("pg-insert");
    let vars = Vars::try_from_pairs([("DATABASE_URL", "postgres://x"), ("EMPTY", "")]).unwrap();

    let record = repo
        .insert(NewConfig {
            app: app.clone(),
            version: 1,
            vars: vars.clone(),
        })
        .await
        .expect("insert");

    let found = repo.find_by_id(record.id).await.unwrap().expect("found");
    assert_eq!(found.vars, vars);
    assert_eq!(found.version, 1);
    assert_eq!(found.app, app);

    let err = repo.insert(NewConfig::initial(app.clone())).await.unwrap_err();
    assert!(matches!(err, ConfigError::Conflict { version: 1, .. }));

    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_postgres_store_scenario() {
    let store = ConfigStore::new(Arc::new(connect().await));
    let app = unique_app("pg-apply");

    let bootstrap = store.current(&app).await.unwrap();
    assert!(bootstrap.vars.is_empty());

    store
        .apply(&app, &Patch::from_legacy([("A", "1"), ("B", "2")]).unwrap())
        .await
        .unwrap();
    let second = store
        .apply(&app, &Patch::from_legacy([("B", ""), ("C", "3")]).unwrap())
        .await
        .unwrap();

    let expected = Vars::try_from_pairs([("A", "1"), ("C", "3")]).unwrap();
    assert_eq!(second.vars, expected);
    assert_eq!(store.current(&app).await.unwrap().id, second.id);
    assert_eq!(store.count(&app).await.unwrap(), 3);

    let versions: Vec<u64> = store
        .history(&app, None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![3, 2, 1]);
}

#[tokio::test]
#[ignore] // Requires database setup
async fn test_postgres_concurrent_stores_share_history() {
    // Two stores over separate pools behave like two processes
    let first = Arc::new(ConfigStore::new(Arc::new(connect().await)).with_apply_retries(10));
    let second = Arc::new(ConfigStore::new(Arc::new(connect().await)).with_apply_retries(10));
    let app = unique_app("pg-race");
    first.current(&app).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = if i % 2 == 0 { first.clone() } else { second.clone() };
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("KEY_{}", i);
            store
                .apply(&app, &Patch::from_legacy([(key.as_str(), "v")]).unwrap())
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let current = first.current(&app).await.unwrap();
    assert_eq!(current.vars.len(), 8);
}
