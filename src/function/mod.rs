//! Function definition authoring
//!
//! - `wizard`: three-step creation flow with forward validation gates
//! - `editor`: tabbed, ungated update flow for an existing definition
//! - `params`: editable parameter rows and derived test inputs
//! - `stub`: signature skeleton generated for an empty body
//! - `dry_run`: client-only simulated execution preview

pub mod dry_run;
pub mod editor;
pub mod params;
pub mod stub;
pub mod wizard;

pub use dry_run::{dry_run, dry_run_with_rng, DryRunResult};
pub use editor::{EditorTab, FunctionEditor};
pub use params::{ParameterDraft, ParameterList, TestInputs};
pub use stub::{generate_stub, stub_if_empty};
pub use wizard::{BasicInfo, FunctionWizard, WizardStep};

pub const MSG_ENTER_API_NAME: &str = "Please enter API name";
pub const MSG_ENTER_DISPLAY_NAME: &str = "Please enter display name";
pub const MSG_INCOMPLETE_PARAMS: &str = "Please complete all parameter definitions";

pub const MSG_CREATED: &str = "Function created";
pub const MSG_CREATE_FAILED: &str = "Failed to create function";
pub const MSG_UPDATED: &str = "Function updated";
pub const MSG_UPDATE_FAILED: &str = "Failed to update function";
