use std::fmt;
use std::sync::Arc;

/// Event handler a parent passes down to a component
///
/// Cheap to clone; every clone invokes the same closure.
pub struct Callback<T> {
    handler: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T: 'static> Callback<T> {
    pub fn new(handler: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// A handler that ignores every event
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    pub fn call(&self, value: T) {
        (self.handler)(value)
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}
