//! Navigation for a terminal host.

use prepdesk_application::Navigator;
use prepdesk_domain::Route;
use tracing::{debug, warn};

/// Reports route changes on the terminal instead of switching screens.
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        match route {
            Route::Login => warn!("session expired, run `prepdesk login` to sign in again"),
            Route::Home => debug!(%route, "navigate"),
        }
    }
}
