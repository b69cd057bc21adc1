use std::collections::BTreeMap;
use std::sync::Arc;

/// Whether the caller waits for a reply or only for the transport to accept
/// the request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CallMode {
    #[default]
    TwoWay,
    OneWay,
}

/// Declared semantics of the remote operation.
///
/// Only `Idempotent` operations may be re-sent after the request could have
/// reached the server.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum OperationMode {
    #[default]
    Normal,
    Idempotent,
}

/// An immutable string-to-string map attached to a call and passed through
/// to the remote side unmodified.
///
/// Cloning is cheap; the entries are shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: Arc<BTreeMap<String, String>>,
}

impl Context {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies the entries out, e.g. for encoding onto the wire.
    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>();
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl From<BTreeMap<String, String>> for Context {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

/// Identity and arguments of one logical remote operation.
///
/// A descriptor is built once per logical call and is never mutated by the
/// invoker, no matter how many attempts it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    pub operation: String,
    pub method_id: u64,
    pub args: Vec<u8>,
    pub call_mode: CallMode,
    pub operation_mode: OperationMode,
    /// The operation produces a value and therefore cannot be sent one-way.
    pub twoway_only: bool,
    pub facet: Option<String>,
}

impl CallDescriptor {
    pub fn new(operation: impl Into<String>, method_id: u64, args: Vec<u8>) -> Self {
        Self {
            operation: operation.into(),
            method_id,
            args,
            call_mode: CallMode::TwoWay,
            operation_mode: OperationMode::Normal,
            twoway_only: false,
            facet: None,
        }
    }

    pub fn with_call_mode(mut self, call_mode: CallMode) -> Self {
        self.call_mode = call_mode;
        self
    }

    pub fn with_operation_mode(mut self, operation_mode: OperationMode) -> Self {
        self.operation_mode = operation_mode;
        self
    }

    pub fn with_twoway_only(mut self, twoway_only: bool) -> Self {
        self.twoway_only = twoway_only;
        self
    }

    pub fn with_facet(mut self, facet: Option<String>) -> Self {
        self.facet = facet;
        self
    }

    pub fn is_one_way(&self) -> bool {
        self.call_mode == CallMode::OneWay
    }

    pub fn is_idempotent(&self) -> bool {
        self.operation_mode == OperationMode::Idempotent
    }
}
