use super::*;
use crate::{
    notify::Severity,
    test_support::{FakeBackend, RecordingNotifier},
};
use shared::domain::GUARDIAN_PLACEHOLDER;

fn cache(backend: Arc<FakeBackend>) -> (GuardianCache, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (GuardianCache::new(backend, notifier.clone()), notifier)
}

#[tokio::test]
async fn refresh_loads_contact_into_snapshot() {
    let backend = Arc::new(FakeBackend::with_guardian("Asha", "+91 98765 43210"));
    let (cache, _) = cache(backend);

    assert_eq!(cache.display_name().await, GUARDIAN_PLACEHOLDER);
    let contact = cache.refresh().await.expect("contact");

    assert_eq!(contact.name(), "Asha");
    assert_eq!(cache.display_name().await, "Asha");
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let backend = Arc::new(FakeBackend::with_guardian("Meera", "555"));
    let (cache, _) = cache(backend.clone());
    cache.refresh().await;

    backend.set_fail_reads(true);
    let contact = cache.refresh().await;

    assert_eq!(contact.as_ref().map(|c| c.name()), Some("Meera"));
    assert_eq!(cache.display_name().await, "Meera");
}

#[tokio::test]
async fn cleared_directory_falls_back_to_placeholder() {
    let backend = Arc::new(FakeBackend::with_guardian("Ravi", "12345"));
    let (cache, _) = cache(backend.clone());
    cache.refresh().await;

    *backend.contact.lock().unwrap() = None;

    assert!(cache.refresh().await.is_none());
    assert_eq!(cache.display_name().await, GUARDIAN_PLACEHOLDER);
}

#[tokio::test]
async fn empty_fields_are_rejected_before_backend_call() {
    let backend = Arc::new(FakeBackend::default());
    let (cache, notifier) = cache(backend.clone());

    let err = cache.save("   ", "555").await.unwrap_err();

    assert!(matches!(err, GuardianSaveError::Validation(_)));
    assert!(!err.is_retryable());
    assert_eq!(backend.save_calls(), 0);
    let toasts = notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].0, "Please enter both name and phone number");
    assert_eq!(toasts[0].1.severity, Severity::Error);
    assert_eq!(toasts[0].1.duration, Duration::from_millis(3000));
}

#[tokio::test]
async fn backend_failure_surfaces_retryable_error_and_keeps_snapshot() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_fail_writes(true);
    let (cache, notifier) = cache(backend.clone());

    let err = cache.save("Asha", "555").await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(backend.save_calls(), 1);
    assert!(cache.snapshot().await.is_none());
    assert_eq!(
        notifier.messages(),
        vec!["Could not save contact. Please try again.".to_string()]
    );
}

#[tokio::test]
async fn successful_save_trims_and_replaces_snapshot() {
    let backend = Arc::new(FakeBackend::default());
    let (cache, notifier) = cache(backend.clone());

    let saved = cache.save("  Asha ", " 555 ").await.expect("save");

    assert_eq!(saved.name(), "Asha");
    assert_eq!(saved.phone_number(), "555");
    assert_eq!(cache.snapshot().await, Some(saved.clone()));
    assert_eq!(*backend.contact.lock().unwrap(), Some(saved));
    let toasts = notifier.toasts();
    assert_eq!(toasts[0].0, "Guardian contact saved successfully!");
    assert_eq!(toasts[0].1, ToastOptions::success(Duration::from_millis(4000)));
}
