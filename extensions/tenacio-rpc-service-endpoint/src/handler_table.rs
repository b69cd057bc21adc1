use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tenacio::{Context, OperationMode};
use tenacio_rpc_service::DEFAULT_FACET;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type RpcPrebufferedHandler<C> = Arc<
    dyn Fn(C, Vec<u8>, Context) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, HandlerError>> + Send>>
        + Send
        + Sync,
>;

/// A handler together with the operation metadata checked on dispatch.
pub struct RegisteredOperation<C> {
    pub name: String,
    pub mode: OperationMode,
    pub handler: RpcPrebufferedHandler<C>,
}

impl<C> Clone for RegisteredOperation<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            mode: self.mode,
            handler: self.handler.clone(),
        }
    }
}

/// One addressable facet: the type ids it claims and its operations.
pub struct Facet<C> {
    pub type_ids: BTreeSet<String>,
    pub operations: HashMap<u64, RegisteredOperation<C>>,
}

impl<C> Default for Facet<C> {
    fn default() -> Self {
        Self {
            type_ids: BTreeSet::new(),
            operations: HashMap::new(),
        }
    }
}

/// All facets of one servant. The default facet always exists.
pub struct HandlerTable<C> {
    facets: HashMap<String, Facet<C>>,
}

impl<C> Default for HandlerTable<C> {
    fn default() -> Self {
        let mut facets = HashMap::new();
        facets.insert(DEFAULT_FACET.to_string(), Facet::default());
        Self { facets }
    }
}

impl<C> HandlerTable<C> {
    pub fn facet(&self, name: &str) -> Option<&Facet<C>> {
        self.facets.get(name)
    }

    pub fn facet_mut(&mut self, name: &str) -> &mut Facet<C> {
        self.facets.entry(name.to_string()).or_default()
    }

    /// Inserts `operation` under `method_id`, refusing duplicates.
    pub fn insert(
        &mut self,
        facet: &str,
        method_id: u64,
        operation: RegisteredOperation<C>,
    ) -> Result<(), String> {
        match self.facet_mut(facet).operations.entry(method_id) {
            Entry::Occupied(existing) => Err(format!(
                "a handler for {} (method ID {}) is already registered on facet {:?}",
                existing.get().name,
                method_id,
                facet
            )),
            Entry::Vacant(entry) => {
                entry.insert(operation);
                Ok(())
            }
        }
    }
}
