//! Modal Dialogs Module
//!
//! - Function wizard: three-step creation of a function definition
//! - Function editor: tabbed update of an existing definition
//! - Confirm delete: yes/no gate in front of every delete

pub mod confirm_delete;
pub mod function_editor;
pub mod function_form;
pub mod function_wizard;

pub use confirm_delete::{confirm_delete_modal, ConfirmAction};
pub use function_editor::{EditorAction, EditorDialog, EditorOutcome};
pub use function_form::FormAction;
pub use function_wizard::{WizardAction, WizardDialog, WizardOutcome};
