//! Redemption workflows
//!
//! Two tools over the same endpoints: the customer-facing claim flow
//! ([`claim::ClaimFlow`]) and the staff-facing validator
//! ([`validator::ValidatorTool`]). State transitions are pure; notices are
//! data the UI renders, not side effects.

pub mod claim;
pub mod validator;

/// A message the UI surfaces without it being part of the flow state.
/// Errors annotate the current state; they never transition it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
