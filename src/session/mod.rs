//! Long-lived interactive sessions: the filterable grid and the search box.
//!
//! Each session is a tokio task driven through its handle; dropping the
//! handle stops the task and any timer it owns.

pub mod grid;
pub mod search;

pub use grid::{GridOptions, GridSession, GridSnapshot};
pub use search::{SearchSession, SearchState, Searcher};
