//! Operations every endpoint answers without a registered handler.

use crate::constants::{IS_A_OPERATION, PING_OPERATION};
use crate::{RpcOperation, method_id_hash};
use std::io;
use tenacio::OperationMode;

/// Asks whether the addressed object (and facet) implements a type id.
pub struct IsA;

impl RpcOperation for IsA {
    const NAME: &'static str = IS_A_OPERATION;
    const METHOD_ID: u64 = method_id_hash(IS_A_OPERATION);
    const MODE: OperationMode = OperationMode::Idempotent;
    const RETURNS_VALUE: bool = true;

    type Input = String;
    type Output = bool;

    fn encode_request(type_id: String) -> Result<Vec<u8>, io::Error> {
        crate::codec::encode_value(&type_id)
    }

    fn decode_request(bytes: &[u8]) -> Result<String, io::Error> {
        crate::codec::decode_value(bytes)
    }

    fn encode_response(output: bool) -> Result<Vec<u8>, io::Error> {
        crate::codec::encode_value(&output)
    }

    fn decode_response(bytes: &[u8]) -> Result<bool, io::Error> {
        crate::codec::decode_value(bytes)
    }
}

crate::rpc_operations! {
    /// Liveness check.
    pub Ping => "ping" () [idempotent];
}

const _: () = assert!(<Ping as RpcOperation>::METHOD_ID == method_id_hash(PING_OPERATION));
