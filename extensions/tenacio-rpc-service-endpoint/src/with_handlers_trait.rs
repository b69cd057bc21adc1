use crate::HandlerTable;

/// A trait that provides a generic, asynchronous interface for accessing a shared
/// `HandlerTable` protected by a mutex.
///
/// This uses a closure-passing pattern to abstract over different mutex types
/// (e.g., `tokio::sync::Mutex` and `std::sync::Mutex`), allowing code to be
/// runtime-agnostic.
#[async_trait::async_trait]
pub trait WithHandlers<C>: Send + Sync
where
    C: Send + Sync + Clone + 'static,
{
    /// Executes a closure with exclusive access to the handler table.
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HandlerTable<C>) -> R + Send,
        R: Send;
}

// Only compile this block if the "tokio_support" feature is active.
#[cfg(feature = "tokio_support")]
#[async_trait::async_trait]
impl<C> WithHandlers<C> for tokio::sync::Mutex<HandlerTable<C>>
where
    C: Send + Sync + Clone + 'static,
{
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HandlerTable<C>) -> R + Send,
        R: Send,
    {
        let mut guard = self.lock().await;
        f(&mut guard)
    }
}

/// The implementation for the standard library's blocking mutex.
///
/// The closure never awaits, so the lock is held only for the table lookup
/// or insertion itself.
#[async_trait::async_trait]
impl<C> WithHandlers<C> for std::sync::Mutex<HandlerTable<C>>
where
    C: Send + Sync + Clone + 'static,
{
    async fn with_handlers<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HandlerTable<C>) -> R + Send,
        R: Send,
    {
        let mut guard = self
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}
