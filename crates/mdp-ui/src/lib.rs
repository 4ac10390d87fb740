//! MDP UI - desktop admin console for the MDP ontology platform

pub mod app;
pub mod backend;
pub mod modals;
pub mod pages;
pub mod toasts;

pub use app::{MdpConsoleApp, Page};
pub use backend::Backend;
