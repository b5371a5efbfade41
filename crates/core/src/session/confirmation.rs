/// Blocking two-option prompt gating destructive operations.
///
/// `confirm` suspends the calling flow until the user decides; there is no
/// timeout and no third state. Dismissing the prompt without an explicit
/// choice counts as a decline.
pub trait ConfirmationPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Prompt whose answer was already given upstream, e.g. by a dialog the UI
/// showed before dispatching the operation.
pub struct AutoConfirm;

impl ConfirmationPrompt for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}
