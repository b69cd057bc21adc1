use super::{HandlerTable, RpcServiceEndpointInterface};
use std::{marker::PhantomData, sync::Arc};

// --- Conditionally Alias the Mutex Implementation ---
#[cfg(not(feature = "tokio_support"))]
use std::sync::Mutex;
#[cfg(feature = "tokio_support")]
use tokio::sync::Mutex;

/// A concrete RPC service endpoint, generic over a context type `C`.
///
/// `C` is whatever the server knows about the connection a request arrived
/// on (e.g. the peer address); it is handed to every handler.
pub struct RpcServiceEndpoint<C>
where
    C: Send + Sync + Clone + 'static,
{
    prebuffered_handlers: Arc<Mutex<HandlerTable<C>>>,
    _context: PhantomData<C>,
}

impl<C> Default for RpcServiceEndpoint<C>
where
    C: Send + Sync + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> RpcServiceEndpoint<C>
where
    C: Send + Sync + Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            prebuffered_handlers: Arc::new(Mutex::new(HandlerTable::default())),
            _context: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<C> RpcServiceEndpointInterface<C> for RpcServiceEndpoint<C>
where
    C: Send + Sync + Clone + 'static,
{
    type HandlersLock = Mutex<HandlerTable<C>>;

    fn get_prebuffered_handlers(&self) -> Arc<Self::HandlersLock> {
        self.prebuffered_handlers.clone()
    }
}
