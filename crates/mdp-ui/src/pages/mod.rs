//! Console pages

pub mod list_page;
pub mod search;

pub use list_page::{ListAction, ListPage};
pub use search::{SearchAction, SearchPage};
