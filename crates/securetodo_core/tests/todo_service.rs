mod common;

use common::MockCapability;
use securetodo_core::{
    AuthFailure, AuthState, Gated, ManualClock, TodoInput, TodoService, TodoStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn service(capability: MockCapability) -> TodoService<MockCapability> {
    TodoService::new(Arc::new(ManualClock::new(1_000)), capability)
}

#[tokio::test]
async fn mutations_run_after_single_authentication() {
    let mut service = service(MockCapability::succeeds_once());

    let id = service
        .add_todo(&TodoInput::new("  Buy milk  ").with_description("  2L  "))
        .await
        .into_option()
        .flatten()
        .expect("todo created");
    assert_eq!(service.auth_state(), AuthState::Authenticated);

    assert_eq!(service.toggle_todo_status(id).await, Gated::Performed(true));
    assert_eq!(service.get(id).unwrap().status, TodoStatus::Completed);
    assert_eq!(service.toggle_todo_status(id).await, Gated::Performed(true));
    assert_eq!(service.get(id).unwrap().status, TodoStatus::Pending);

    assert_eq!(
        service.update_todo(id, &TodoInput::new("Buy oat milk")).await,
        Gated::Performed(true)
    );
    assert_eq!(service.delete_todo(id).await, Gated::Performed(true));
    assert_eq!(service.counts().total, 0);
    assert_eq!(service.gate().capability().prompts(), 1);
}

#[tokio::test]
async fn failed_authentication_leaves_store_untouched() {
    let mut service = service(MockCapability::not_enrolled());
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    service.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let before = service.snapshot();

    let outcome = service.add_todo(&TodoInput::new("secret")).await;

    assert_eq!(outcome, Gated::NotPerformed(AuthFailure::NotEnrolled));
    assert!(service.snapshot().same_as(&before));
    assert_eq!(notified.load(Ordering::SeqCst), 0);
    assert!(!service.is_trusted());
}

#[tokio::test]
async fn blank_title_is_performed_but_creates_nothing() {
    let mut service = service(MockCapability::succeeds_once());

    let outcome = service.add_todo(&TodoInput::new("   ")).await;

    assert_eq!(outcome, Gated::Performed(None));
    assert_eq!(service.counts().total, 0);
}

#[tokio::test]
async fn logout_requires_authenticating_again() {
    let mut service = service(MockCapability::succeeds_once());
    service.authenticate().await.unwrap();
    service.add_todo(&TodoInput::new("first")).await.into_option().unwrap();

    service.logout();
    assert_eq!(service.auth_state(), AuthState::Idle);

    let outcome = service.add_todo(&TodoInput::new("second")).await;
    assert!(matches!(outcome, Gated::NotPerformed(AuthFailure::Failed(_))));
    assert_eq!(service.counts().total, 1);
    assert_eq!(service.gate().capability().prompts(), 2);
}

#[tokio::test]
async fn observers_receive_each_new_snapshot() {
    let mut service = service(MockCapability::succeeds_once());
    let versions = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = versions.clone();
    service.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.version()));

    let id = service
        .add_todo(&TodoInput::new("observe"))
        .await
        .into_option()
        .flatten()
        .unwrap();
    let _ = service.toggle_todo_status(id).await;
    let _ = service.delete_todo(uuid::Uuid::new_v4()).await;

    assert_eq!(*versions.lock().unwrap(), vec![1, 2]);
}
