use std::io;
use tenacio::{CallDescriptor, OperationMode};

/// A remote operation: its wire identity plus the encoding of its arguments
/// and result.
///
/// Implementations are normally generated with [`rpc_operations!`](crate::rpc_operations)
/// rather than written by hand.
pub trait RpcOperation {
    /// The operation name as it travels on the wire (e.g. `"getSizeX"`).
    const NAME: &'static str;

    /// A unique identifier derived from `NAME` (see [`rpc_method_id!`](crate::rpc_method_id)).
    const METHOD_ID: u64;

    const MODE: OperationMode = OperationMode::Normal;

    /// Operations that return a value can only be invoked two-way.
    const RETURNS_VALUE: bool;

    /// The high-level argument type (a tuple when there are several).
    type Input;

    /// The high-level result type.
    type Output;

    fn encode_request(input: Self::Input) -> Result<Vec<u8>, io::Error>;

    fn decode_request(bytes: &[u8]) -> Result<Self::Input, io::Error>;

    fn encode_response(output: Self::Output) -> Result<Vec<u8>, io::Error>;

    fn decode_response(bytes: &[u8]) -> Result<Self::Output, io::Error>;

    /// Builds the call descriptor for one invocation with the default
    /// (two-way) call mode.
    fn call_descriptor(input: Self::Input) -> Result<CallDescriptor, io::Error> {
        Ok(
            CallDescriptor::new(Self::NAME, Self::METHOD_ID, Self::encode_request(input)?)
                .with_operation_mode(Self::MODE)
                .with_twoway_only(Self::RETURNS_VALUE),
        )
    }
}

/// An interface a remote object can implement, identified by its type id
/// (e.g. `"::formats::IFormatReader"`).
pub trait ServiceType {
    const TYPE_ID: &'static str;
}
