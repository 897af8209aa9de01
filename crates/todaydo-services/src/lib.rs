//! Dashboard services for Today Do: todos, quick notes, pomodoro timer,
//! daily quote, clock face and the search shortcut.

pub mod datetime;
pub mod notes;
pub mod pomodoro;
pub mod quote;
pub mod schedule;
pub mod search;
pub mod todo;

pub use datetime::{format_date, format_time};
pub use notes::{QuickNotes, SaveStatus};
pub use pomodoro::{Phase, Pomodoro, PomodoroEvent};
pub use quote::{Quote, QuoteBoard, QuoteBook};
pub use search::{SearchEngine, SearchPreference};
pub use todo::{Priority, Todo, TodoError, TodoList, TodoResult, TodoStats};
