//! Authentication collaborator seam.
//!
//! Leaving EMERGENCY requires a successful verification; the core only
//! consumes the verdict. PIN/biometric mechanics live outside.

pub trait Authenticator: Send + Sync {
    /// Returns whether the user verified their identity.
    fn authenticate(&self) -> bool;
}

/// Always succeeds. For unattended sessions and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl Authenticator for ApproveAll {
    fn authenticate(&self) -> bool {
        true
    }
}

/// Always refuses. The safe default when no verifier is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self) -> bool {
        false
    }
}
