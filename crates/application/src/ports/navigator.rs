//! Navigation port

use prepdesk_domain::Route;

/// Port through which the session layer asks its host to change screens.
pub trait Navigator: Send + Sync {
    /// Navigates to the given route.
    fn navigate(&self, route: Route);
}
