mod confirm_dialog;
mod text_input;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use text_input::{TextInput, TextInputEvent};
