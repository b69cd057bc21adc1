/// Facet addressed when a proxy names none.
pub const DEFAULT_FACET: &str = "";

/// Wire name of the built-in type check answered by every endpoint.
pub const IS_A_OPERATION: &str = "is_a";

/// Wire name of the built-in liveness check answered by every endpoint.
pub const PING_OPERATION: &str = "ping";
