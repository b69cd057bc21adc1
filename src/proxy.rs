use crate::{CallDescriptor, CallMode, Context};

/// Per-proxy call settings applied to every descriptor issued through it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyOptions {
    call_mode: CallMode,
    default_context: Option<Context>,
    facet: Option<String>,
}

impl ProxyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_one_way(mut self) -> Self {
        self.call_mode = CallMode::OneWay;
        self
    }

    pub fn with_two_way(mut self) -> Self {
        self.call_mode = CallMode::TwoWay;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.default_context = Some(context);
        self
    }

    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        let facet = facet.into();
        self.facet = if facet.is_empty() { None } else { Some(facet) };
        self
    }

    pub fn call_mode(&self) -> CallMode {
        self.call_mode
    }

    pub fn default_context(&self) -> Option<&Context> {
        self.default_context.as_ref()
    }

    pub fn facet(&self) -> Option<&str> {
        self.facet.as_deref()
    }

    /// Stamps the proxy's call mode and facet onto a descriptor.
    pub fn apply(&self, call: CallDescriptor) -> CallDescriptor {
        call.with_call_mode(self.call_mode)
            .with_facet(self.facet.clone())
    }

    /// Resolves the context for one call.
    ///
    /// An implicit call (`None`) uses the proxy's default context. An
    /// explicit call uses exactly the context it was given, and an explicit
    /// empty context stays empty even when the proxy has a default.
    pub fn resolve_context<'a>(&'a self, explicit: Option<&'a Context>) -> Option<&'a Context> {
        match explicit {
            Some(context) => Some(context),
            None => self.default_context.as_ref(),
        }
    }
}
