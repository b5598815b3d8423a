use super::*;
use chrono::Duration;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn guardian_is_unset_on_fresh_database() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert!(storage
        .load_guardian_contact()
        .await
        .expect("load")
        .is_none());
}

#[tokio::test]
async fn saving_guardian_overwrites_single_record() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = GuardianContact::new("Asha", "9876543210").expect("contact");
    let second = GuardianContact::new("Ravi", "9123456780").expect("contact");

    storage.save_guardian_contact(&first).await.expect("save");
    storage.save_guardian_contact(&second).await.expect("save");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guardian_contact")
        .fetch_one(storage.pool())
        .await
        .expect("count");
    assert_eq!(count, 1);
    assert_eq!(
        storage.load_guardian_contact().await.expect("load"),
        Some(second)
    );
}

#[tokio::test]
async fn panic_log_lists_in_append_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let base = Utc::now();
    let first = storage.append_panic_log_at(base).await.expect("first");
    let second = storage
        .append_panic_log_at(base + Duration::seconds(5))
        .await
        .expect("second");

    let log = storage.list_panic_log().await.expect("list");
    assert_eq!(log, vec![first, second]);
}

#[tokio::test]
async fn panic_log_timestamps_never_go_backwards() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let base = Utc::now();
    let first = storage.append_panic_log_at(base).await.expect("first");
    let skewed = storage
        .append_panic_log_at(base - Duration::minutes(10))
        .await
        .expect("skewed");

    assert!(skewed.timestamp >= first.timestamp);
    let log = storage.list_panic_log().await.expect("list");
    assert!(log.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[test]
fn in_memory_urls_have_no_parent_directory() {
    assert!(sqlite_path("sqlite::memory:").is_none());
    assert!(sqlite_path("postgres://localhost/db").is_none());
    assert_eq!(
        sqlite_path("sqlite://./data/app.db?mode=rwc"),
        Some(PathBuf::from("./data/app.db"))
    );
}
