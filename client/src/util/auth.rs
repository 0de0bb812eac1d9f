//! Shared route-guard helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views should apply identical redirect behavior for unauthenticated and
//! under-privileged users. The guard only decides; navigation is the caller's.

use identity::Role;

use crate::state::auth::AuthState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    RedirectLogin,
    RedirectHome,
    /// Auth state is still loading; render nothing and decide later.
    Pending,
}

impl GuardOutcome {
    /// Target path for the redirect outcomes.
    #[must_use]
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::RedirectLogin => Some("/login"),
            Self::RedirectHome => Some("/"),
            Self::Allow | Self::Pending => None,
        }
    }
}

/// Decide access for a view that requires a session and, when `required` is
/// non-empty, at least one of those roles.
#[must_use]
pub fn route_guard(state: &AuthState, required: &[Role]) -> GuardOutcome {
    if state.is_loading {
        return GuardOutcome::Pending;
    }
    if !state.is_authenticated || state.user.is_none() {
        return GuardOutcome::RedirectLogin;
    }
    if !required.is_empty() && !has_role(state, required) {
        return GuardOutcome::RedirectHome;
    }
    GuardOutcome::Allow
}

/// Whether the signed-in user holds any of `roles`.
#[must_use]
pub fn has_role(state: &AuthState, roles: &[Role]) -> bool {
    state.user.as_ref().is_some_and(|user| user.has_any_role(roles))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
