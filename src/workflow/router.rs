//! Pure routing decision taken after the compliance check.

use super::state::AuditState;

/// Outgoing route selected after the compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Content is compliant; the workflow ends.
    Terminate,
    /// Content failed; redact before ending.
    Remediate,
}

/// Select the route for the current state from its `compliant` flag.
pub fn route(state: &AuditState) -> Route {
    if state.compliant() {
        Route::Terminate
    } else {
        Route::Remediate
    }
}
