//! Confirmation gate for destructive actions

/// Yes/no prompt shown before a scene is deleted
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that always answers yes
pub struct AlwaysConfirm;

impl ConfirmGate for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Gate that always answers no
pub struct NeverConfirm;

impl ConfirmGate for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
