//! Todo list persisted under `today-do-todos`.
//!
//! The list is kept in memory and written back to the store after every
//! change. New items go to the front; [`TodoList::sorted`] gives the display
//! order.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use todaydo_core::store::keys;
use todaydo_core::{Clock, KvStore, StoreError, SystemClock};

/// Errors that can occur during todo operations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// Todo was not found.
    #[error("Todo not found: {0}")]
    NotFound(String),

    /// Todo text was empty after trimming.
    #[error("Todo text cannot be empty")]
    EmptyText,

    /// `clear_completed` with nothing to clear.
    #[error("No completed todos")]
    NothingCompleted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "That todo no longer exists.",
            Self::EmptyText => "Please enter a todo.",
            Self::NothingCompleted => "There are no completed todos.",
            Self::Store(e) => e.user_message(),
        }
    }
}

pub type TodoResult<T> = Result<T, TodoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Unix milliseconds
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

pub struct TodoList {
    store: KvStore,
    clock: Arc<dyn Clock>,
    todos: RwLock<Vec<Todo>>,
}

impl fmt::Debug for TodoList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoList")
            .field("todos", &self.todos.read().len())
            .finish_non_exhaustive()
    }
}

impl TodoList {
    pub fn load(store: KvStore) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: KvStore, clock: Arc<dyn Clock>) -> Self {
        let todos: Vec<Todo> = store.get(keys::TODOS, Vec::new());
        tracing::debug!("Loaded {} todos", todos.len());
        Self {
            store,
            clock,
            todos: RwLock::new(todos),
        }
    }

    /// Todos in stored order (newest added first).
    pub fn list(&self) -> Vec<Todo> {
        self.todos.read().clone()
    }

    /// Display order: incomplete first, then priority high to low, then newest first.
    pub fn sorted(&self) -> Vec<Todo> {
        let mut todos = self.list();
        todos.sort_by_key(|t| (t.completed, Reverse(t.priority), Reverse(t.created_at)));
        todos
    }

    pub fn get(&self, id: &str) -> Option<Todo> {
        self.todos.read().iter().find(|t| t.id == id).cloned()
    }

    pub fn stats(&self) -> TodoStats {
        let todos = self.todos.read();
        let completed = todos.iter().filter(|t| t.completed).count();
        TodoStats {
            total: todos.len(),
            completed,
            remaining: todos.len() - completed,
        }
    }

    pub fn add(&self, text: &str, priority: Priority) -> TodoResult<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }

        let todo = Todo {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            priority,
            created_at: self.clock.now_millis(),
        };

        self.mutate(|todos| {
            todos.insert(0, todo.clone());
            Ok(())
        })?;
        tracing::info!("Added todo {}", todo.id);
        Ok(todo)
    }

    pub fn toggle(&self, id: &str) -> TodoResult<Todo> {
        self.update_one(id, |todo| todo.completed = !todo.completed)
    }

    pub fn update_text(&self, id: &str, text: &str) -> TodoResult<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }
        self.update_one(id, |todo| todo.text = text.to_string())
    }

    pub fn update_priority(&self, id: &str, priority: Priority) -> TodoResult<Todo> {
        self.update_one(id, |todo| todo.priority = priority)
    }

    pub fn delete(&self, id: &str) -> TodoResult<Todo> {
        let removed = self.mutate(|todos| {
            let index = todos
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| TodoError::not_found(id))?;
            Ok(todos.remove(index))
        })?;
        tracing::info!("Deleted todo {}", id);
        Ok(removed)
    }

    /// Remove every completed todo and return how many were removed.
    pub fn clear_completed(&self) -> TodoResult<usize> {
        let removed = self.mutate(|todos| {
            let before = todos.len();
            todos.retain(|t| !t.completed);
            match before - todos.len() {
                0 => Err(TodoError::NothingCompleted),
                n => Ok(n),
            }
        })?;
        tracing::info!("Cleared {} completed todos", removed);
        Ok(removed)
    }

    fn update_one(&self, id: &str, f: impl FnOnce(&mut Todo)) -> TodoResult<Todo> {
        self.mutate(|todos| {
            let todo = todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| TodoError::not_found(id))?;
            f(todo);
            Ok(todo.clone())
        })
    }

    /// Apply `f` to a copy of the list, persist it, then publish it.
    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Todo>) -> TodoResult<T>) -> TodoResult<T> {
        let mut todos = self.todos.write();
        let mut next = todos.clone();
        let out = f(&mut next)?;
        self.store.set(keys::TODOS, &next)?;
        *todos = next;
        Ok(out)
    }
}
