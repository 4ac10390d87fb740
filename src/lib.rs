//! MDP Console - admin console core for the MDP ontology platform
//!
//! This crate holds the UI-independent state of the console: the function
//! definition wizard and editor, list pages with confirm-delete, and the
//! facet search page. Every operation talks to the backend through
//! [`mdp_client::MdpClient`], so the same state machines drive the egui
//! console (`crates/mdp-ui`), the `mdp` CLI, and the tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mdp_client::InMemoryClient;
//! use mdp_console::function::FunctionWizard;
//!
//! # async fn demo() -> Result<(), mdp_console::ConsoleError> {
//! let client = InMemoryClient::seeded();
//! let mut wizard = FunctionWizard::new();
//! wizard.basic.api_name = "order_count".into();
//! wizard.basic.display_name = "Order Count".into();
//! wizard.next()?;
//! wizard.next()?;
//! let created = wizard.submit(&client, None).await?;
//! assert_eq!(created.api_name, "order_count");
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Environment configuration and tracing setup
pub mod config;
pub mod logging;

// Notices returned to the caller instead of shown directly
pub mod notify;

// Pending-result plumbing for async calls from a frame loop
pub mod task;

// Function definition wizard, editor and helpers
pub mod function;

// List pages and confirm-delete
pub mod list;

// Facet search page
pub mod search;

pub use config::{ConfigError, ConsoleConfig};
pub use error::{ConsoleError, ValidationError};
pub use function::{FunctionEditor, FunctionWizard, WizardStep};
pub use list::{DeletableResource, DeleteConfirm, ListState, LoadState, Resource};
pub use notify::{Notice, Notices, Severity};
pub use search::FacetSearch;
pub use task::{spawn_pending, PendingSlot, SlotWriter};
