//! Integration tests for the store and its bindings.

use fabux::{create_store, RedoStack, Store, StoreContext, TurnScheduler};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Todo {
    id: u32,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppState {
    user_name: String,
    todos: Vec<Todo>,
}

#[derive(Clone, Debug, PartialEq)]
enum AppAction {
    AddTodo { title: String, id: u32 },
    CompleteTodo { id: u32 },
    UpdateName { name: String },
}

fn reducer(state: &AppState, action: &AppAction) -> AppState {
    match action {
        AppAction::AddTodo { title, id } => {
            let mut todos = state.todos.clone();
            todos.push(Todo {
                id: *id,
                title: title.clone(),
                completed: false,
            });
            AppState {
                todos,
                ..state.clone()
            }
        }
        AppAction::CompleteTodo { id } => {
            let Some(found) = state.todos.iter().find(|todo| todo.id == *id) else {
                return state.clone();
            };
            // Completed todos move to the end
            let mut todos: Vec<Todo> = state
                .todos
                .iter()
                .filter(|todo| todo.id != *id)
                .cloned()
                .collect();
            todos.push(Todo {
                completed: true,
                ..found.clone()
            });
            AppState {
                todos,
                ..state.clone()
            }
        }
        AppAction::UpdateName { name } => AppState {
            user_name: name.clone(),
            ..state.clone()
        },
    }
}

fn add_todo(title: &str, id: u32) -> AppAction {
    AppAction::AddTodo {
        title: title.to_string(),
        id,
    }
}

fn todo_store() -> Store<AppState, AppAction> {
    create_store(reducer, AppState::default())
}

// --- Realistic Workflow Tests ---

#[test]
fn test_todo_undo_walkthrough() {
    let store = todo_store();

    store.dispatch(add_todo("milk", 1));
    assert_eq!(
        serde_json::to_value(&*store.get_state()).unwrap(),
        json!({"userName": "", "todos": [{"id": 1, "title": "milk", "completed": false}]})
    );

    store.dispatch(AppAction::CompleteTodo { id: 1 });
    assert_eq!(
        serde_json::to_value(&store.get_state().todos).unwrap(),
        json!([{"id": 1, "title": "milk", "completed": true}])
    );

    assert_eq!(store.undo(), Some(AppAction::CompleteTodo { id: 1 }));
    assert_eq!(
        serde_json::to_value(&store.get_state().todos).unwrap(),
        json!([{"id": 1, "title": "milk", "completed": false}])
    );

    assert_eq!(store.undo(), Some(add_todo("milk", 1)));
    assert!(store.get_state().todos.is_empty());

    let before = store.get_state();
    assert_eq!(store.undo(), None);
    assert!(Arc::ptr_eq(&before, &store.get_state()));
}

#[test]
fn test_complete_unknown_todo_keeps_state() {
    let store = todo_store();
    store.dispatch(add_todo("milk", 1));
    store.dispatch(AppAction::CompleteTodo { id: 42 });

    assert_eq!(store.get_state().todos.len(), 1);
    assert!(!store.get_state().todos[0].completed);
    // Still recorded, so it can be undone
    assert_eq!(store.history_len(), 2);
}

#[test]
fn test_completed_todos_move_to_end() {
    let store = todo_store();
    store.dispatch(add_todo("milk", 1));
    store.dispatch(add_todo("eggs", 2));
    store.dispatch(AppAction::CompleteTodo { id: 1 });

    let ids: Vec<u32> = store.get_state().todos.iter().map(|todo| todo.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn test_redo_after_undo() {
    let store = Arc::new(todo_store());
    let redo = RedoStack::new(Arc::clone(&store));

    store.dispatch(add_todo("milk", 1));
    store.dispatch(AppAction::UpdateName {
        name: "ada".to_string(),
    });

    redo.undo();
    assert_eq!(store.get_state().user_name, "");
    assert!(redo.can_redo());

    assert_eq!(
        redo.redo(),
        Some(AppAction::UpdateName {
            name: "ada".to_string()
        })
    );
    assert_eq!(store.get_state().user_name, "ada");
    assert_eq!(store.history_len(), 2);
}

#[test]
fn test_middleware_stamps_actions() {
    let store = todo_store();
    let _upper = store.add_middleware(|action: AppAction| match action {
        AppAction::AddTodo { title, id } => AppAction::AddTodo {
            title: title.to_uppercase(),
            id,
        },
        other => other,
    });

    store.dispatch(add_todo("milk", 1));
    assert_eq!(store.get_state().todos[0].title, "MILK");
    // History keeps the transformed action so replay matches
    assert_eq!(store.history(), vec![add_todo("MILK", 1)]);

    store.dispatch(add_todo("eggs", 2));
    store.undo();
    assert_eq!(store.get_state().todos[0].title, "MILK");
}

#[test]
fn test_context_driven_app() {
    let scheduler = Arc::new(TurnScheduler::new());
    let context = StoreContext::new(Arc::new(todo_store()), scheduler.clone());

    let title_renders = Arc::new(Mutex::new(Vec::new()));
    let name = context
        .select(|state: &AppState| state.user_name.clone())
        .unwrap();
    let _title = {
        let title_renders = Arc::clone(&title_renders);
        let reader = context.clone();
        context
            .subscription(move || {
                let state = reader.get_state().unwrap();
                title_renders.lock().push(state.user_name.clone());
            })
            .unwrap()
    };
    let todo_count = context.select(|state: &AppState| state.todos.len()).unwrap();
    let can_undo = context.watch_can_undo().unwrap();

    // One burst, one notification per listener
    context.dispatch(add_todo("milk", 1)).unwrap();
    context.dispatch(add_todo("eggs", 2)).unwrap();
    context
        .dispatch(AppAction::UpdateName {
            name: "grace".to_string(),
        })
        .unwrap();
    assert!(title_renders.lock().is_empty());

    scheduler.run_turn();
    assert_eq!(*title_renders.lock(), vec!["grace".to_string()]);
    assert_eq!(name.get(), "grace");
    assert_eq!(todo_count.get(), 2);
    assert!(can_undo.get());

    // Name is unchanged by this one, so its selection does not change
    context.dispatch(AppAction::CompleteTodo { id: 2 }).unwrap();
    scheduler.run_turn();
    assert_eq!(name.changes(), 1);
    assert_eq!(title_renders.lock().len(), 2);
}

#[test]
fn test_dispatch_listener_observes_redone_actions() {
    let scheduler = Arc::new(TurnScheduler::new());
    let context = StoreContext::new(Arc::new(todo_store()), scheduler.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let _listener = {
        let seen = Arc::clone(&seen);
        context
            .dispatch_listener(move |action: AppAction| seen.lock().push(action))
            .unwrap()
    };

    context.dispatch(add_todo("milk", 1)).unwrap();
    context.dispatch(AppAction::CompleteTodo { id: 1 }).unwrap();
    scheduler.run_turn();

    assert_eq!(
        *seen.lock(),
        vec![add_todo("milk", 1), AppAction::CompleteTodo { id: 1 }]
    );

    let redo = context.redo_stack().unwrap();
    redo.undo();
    redo.redo();
    scheduler.run_turn();

    // The redone dispatch is observed like any other
    assert_eq!(seen.lock().len(), 3);
}
