//! Session observer port

/// Receives session invalidation synchronously, before the failing request
/// returns to its caller.
pub trait SessionObserver: Send + Sync {
    /// The session could not be recovered; the token store is already empty.
    fn session_invalidated(&self, reason: &str);
}
