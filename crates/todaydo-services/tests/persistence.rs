//! Services backed by an on-disk store survive a restart.

use std::time::Duration;

use todaydo_core::store::keys;
use todaydo_core::KvStore;
use todaydo_services::{Priority, QuickNotes, SearchEngine, SearchPreference, TodoList};

#[test]
fn test_todos_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let todos = TodoList::load(KvStore::open(dir.path()).unwrap());
        todos.add("water the plants", Priority::High).unwrap();
        let todo = todos.add("buy milk", Priority::Low).unwrap();
        todos.toggle(&todo.id).unwrap();
        todo.id
    };

    let todos = TodoList::load(KvStore::open(dir.path()).unwrap());
    let sorted = todos.sorted();
    assert_eq!(sorted.len(), 2);
    assert_eq!(sorted[0].text, "water the plants");
    assert_eq!(sorted[1].id, id);
    assert!(sorted[1].completed);
    assert!(dir.path().join("today-do-todos.json").exists());
}

#[test]
fn test_corrupt_todo_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("today-do-todos.json"), "{\"oops\": true}").unwrap();

    let todos = TodoList::load(KvStore::open(dir.path()).unwrap());
    assert!(todos.list().is_empty());

    // The next write replaces the corrupt value
    todos.add("fresh start", Priority::Medium).unwrap();
    let reloaded = TodoList::load(KvStore::open(dir.path()).unwrap());
    assert_eq!(reloaded.list().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_notes_written_to_disk_after_debounce() {
    let dir = tempfile::tempdir().unwrap();
    let store = KvStore::open(dir.path()).unwrap();
    let notes = QuickNotes::load(store.clone());

    notes.set("call mom");
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let reopened = QuickNotes::load(KvStore::open(dir.path()).unwrap());
    assert_eq!(reopened.text(), "call mom");
    assert!(store.contains(keys::NOTES));
}

#[test]
fn test_search_engine_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    SearchPreference::new(KvStore::open(dir.path()).unwrap())
        .set_engine(SearchEngine::Naver)
        .unwrap();

    let pref = SearchPreference::new(KvStore::open(dir.path()).unwrap());
    assert_eq!(pref.engine(), SearchEngine::Naver);
    assert_eq!(
        pref.search_url("today").as_deref(),
        Some("https://search.naver.com/search.naver?query=today")
    );
}
