use std::sync::OnceLock;

/// Process-wide externally reachable base URL, discovered from the tunnel.
///
/// Written at most once during startup and read by every QR request after
/// that. When it was never set, callers fall back to the request's own host.
#[derive(Debug, Default)]
pub struct PublicUrl {
    value: OnceLock<String>,
}

impl PublicUrl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the URL. Returns false if a value was already set.
    pub fn set(&self, url: impl Into<String>) -> bool {
        self.value.set(url.into()).is_ok()
    }

    pub fn get(&self) -> Option<&str> {
        self.value.get().map(String::as_str)
    }
}
