use shared::domain::GuardianContact;
use storage::Storage;

#[tokio::test]
async fn guardian_and_panic_log_survive_reopen() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("companion.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("db");
        let contact = GuardianContact::new("Asha", "9876543210").expect("contact");
        storage.save_guardian_contact(&contact).await.expect("save");
        storage.append_panic_log().await.expect("log one");
        storage.append_panic_log().await.expect("log two");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let guardian = reopened
        .load_guardian_contact()
        .await
        .expect("load")
        .expect("guardian persisted");
    assert_eq!(guardian.name(), "Asha");
    assert_eq!(reopened.list_panic_log().await.expect("list").len(), 2);
}
