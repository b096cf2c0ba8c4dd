use securetodo_core::{ManualClock, SystemClock, TodoInput, TodoItem, TodoStatus, TodoStore};
use std::sync::Arc;
use uuid::Uuid;

fn manual_store() -> (TodoStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    (TodoStore::new(clock.clone()), clock)
}

#[test]
fn add_scenario_trims_title_and_description() {
    let (mut store, _) = manual_store();
    store
        .add_todo(&TodoInput::new("  Buy milk  ").with_description("  2L  "))
        .unwrap();

    let snapshot = store.snapshot();
    let first = &snapshot.items()[0];
    assert_eq!(first.title, "Buy milk");
    assert_eq!(first.description.as_deref(), Some("2L"));
    assert_eq!(first.status, TodoStatus::Pending);
}

#[test]
fn new_todos_are_prepended() {
    let (mut store, _) = manual_store();
    let a = store.add_todo(&TodoInput::new("A")).unwrap();
    let b = store.add_todo(&TodoInput::new("B")).unwrap();

    let ids: Vec<_> = store.snapshot().items().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![b, a]);
}

#[test]
fn toggle_twice_restores_status_with_non_decreasing_updated_at() {
    let (mut store, clock) = manual_store();
    let id = store.add_todo(&TodoInput::new("Toggle me")).unwrap();
    let created = store.get(id).unwrap().updated_at;

    clock.advance(5);
    assert!(store.toggle_todo_status(id));
    let first = store.get(id).unwrap().clone();
    assert_eq!(first.status, TodoStatus::Completed);
    assert!(first.updated_at >= created);

    clock.set(0);
    assert!(store.toggle_todo_status(id));
    let second = store.get(id).unwrap().clone();
    assert_eq!(second.status, TodoStatus::Pending);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.created_at, created);
}

#[test]
fn update_preserves_identity_and_refreshes_timestamp() {
    let (mut store, clock) = manual_store();
    let id = store
        .add_todo(&TodoInput::new("Old title").with_description("Old desc"))
        .unwrap();
    let original = store.get(id).unwrap().clone();

    clock.advance(250);
    assert!(store.update_todo(id, &TodoInput::new("New title").with_description("New desc")));

    let updated = store.get(id).unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.description.as_deref(), Some("New desc"));
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.updated_at, original.updated_at + 250);
}

#[test]
fn update_can_clear_description() {
    let (mut store, _) = manual_store();
    let id = store
        .add_todo(&TodoInput::new("t").with_description("d"))
        .unwrap();

    assert!(store.update_todo(id, &TodoInput::new("t").with_description("   ")));
    assert_eq!(store.get(id).unwrap().description, None);
}

#[test]
fn update_with_unknown_id_leaves_collection_unchanged() {
    let (mut store, _) = manual_store();
    store.add_todo(&TodoInput::new("one")).unwrap();
    store.add_todo(&TodoInput::new("two")).unwrap();
    let before = store.snapshot();

    assert!(!store.update_todo(Uuid::new_v4(), &TodoInput::new("ghost")));

    let after = store.snapshot();
    assert_eq!(after.items().len(), before.items().len());
    assert_eq!(after.items(), before.items());
    assert_eq!(after.version(), before.version());
}

#[test]
fn delete_removes_exactly_one_and_keeps_others_untouched() {
    let (mut store, _) = manual_store();
    let a = store.add_todo(&TodoInput::new("Item 1")).unwrap();
    let b = store.add_todo(&TodoInput::new("Item 2")).unwrap();
    let c = store.add_todo(&TodoInput::new("Item 3")).unwrap();
    store.toggle_todo_status(a);
    let survivors: Vec<TodoItem> = store
        .snapshot()
        .items()
        .iter()
        .filter(|item| item.id != b)
        .cloned()
        .collect();

    assert!(store.delete_todo(b));
    assert!(store.get(b).is_none());
    assert_eq!(store.snapshot().items(), survivors.as_slice());
    assert!(store.get(c).is_some());

    assert!(!store.delete_todo(b));
    assert_eq!(store.len(), 2);
}

#[test]
fn selectors_split_pending_and_completed() {
    let mut store = TodoStore::new(Arc::new(SystemClock));
    let first = store.add_todo(&TodoInput::new("Pending item")).unwrap();
    let second = store.add_todo(&TodoInput::new("Completed item")).unwrap();
    store.toggle_todo_status(second);

    let pending = store.pending();
    let completed = store.completed();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first);
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, second);
}

#[test]
fn with_initial_keeps_order_and_drops_invalid_or_duplicate_items() {
    let clock = Arc::new(ManualClock::new(0));
    let a = TodoItem::create(Uuid::new_v4(), &TodoInput::new("a"), 10).unwrap();
    let b = TodoItem::create(Uuid::new_v4(), &TodoInput::new("b"), 20).unwrap();
    let mut blank = TodoItem::create(Uuid::new_v4(), &TodoInput::new("c"), 30).unwrap();
    blank.title = "  ".to_string();

    let store = TodoStore::with_initial(clock, vec![a.clone(), blank, b.clone(), a.clone()]);

    assert_eq!(store.snapshot().items(), &[a, b][..]);
    assert_eq!(store.snapshot().version(), 0);
}

#[test]
fn ids_are_unique_across_many_creates() {
    let (mut store, _) = manual_store();
    let mut ids = std::collections::HashSet::new();
    for n in 0..200 {
        let id = store.add_todo(&TodoInput::new(format!("todo {n}"))).unwrap();
        assert!(ids.insert(id));
    }
    assert_eq!(store.len(), 200);
}
