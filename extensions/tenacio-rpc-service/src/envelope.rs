use crate::{RpcResultStatus, codec};
use bitcode::{Decode, Encode};
use tenacio::utils::ONE_WAY_REQUEST_ID;
use tenacio::{CallDescriptor, Context, OperationMode, RpcFailure};

/// One request as it travels over the wire.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    /// `ONE_WAY_REQUEST_ID` for one-way requests, which get no reply.
    pub request_id: u32,
    pub method_id: u64,
    pub operation: String,
    pub facet: String,
    pub idempotent: bool,
    pub context: Vec<(String, String)>,
    pub payload: Vec<u8>,
}

impl RequestEnvelope {
    pub fn from_call(request_id: u32, call: &CallDescriptor, context: &Context) -> Self {
        Self {
            request_id: if call.is_one_way() {
                ONE_WAY_REQUEST_ID
            } else {
                request_id
            },
            method_id: call.method_id,
            operation: call.operation.clone(),
            facet: call.facet.clone().unwrap_or_default(),
            idempotent: call.is_idempotent(),
            context: context.to_vec(),
            payload: call.args.clone(),
        }
    }

    pub fn is_one_way(&self) -> bool {
        self.request_id == ONE_WAY_REQUEST_ID
    }

    pub fn operation_mode(&self) -> OperationMode {
        if self.idempotent {
            OperationMode::Idempotent
        } else {
            OperationMode::Normal
        }
    }

    pub fn context(&self) -> Context {
        self.context.iter().cloned().collect()
    }

    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RpcFailure> {
        codec::decode_value(bytes).map_err(|e| RpcFailure::Protocol(format!("bad request: {e}")))
    }
}

/// The answer to one two-way request.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct ReplyEnvelope {
    pub request_id: u32,
    pub status: u8,
    pub payload: Vec<u8>,
}

impl ReplyEnvelope {
    pub fn success(request_id: u32, payload: Vec<u8>) -> Self {
        Self {
            request_id,
            status: RpcResultStatus::Success.into(),
            payload,
        }
    }

    pub fn failure(request_id: u32, status: RpcResultStatus, payload: Vec<u8>) -> Self {
        Self {
            request_id,
            status: status.into(),
            payload,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RpcFailure> {
        codec::decode_value(bytes).map_err(|e| RpcFailure::Protocol(format!("bad reply: {e}")))
    }

    pub fn status(&self) -> Result<RpcResultStatus, RpcFailure> {
        RpcResultStatus::try_from(self.status)
            .map_err(|_| RpcFailure::Protocol(format!("unknown reply status {}", self.status)))
    }

    /// Unwraps the reply payload, or maps its status to the failure the
    /// caller of `operation` on `facet` sees.
    pub fn into_result(self, operation: &str, facet: &str) -> Result<Vec<u8>, RpcFailure> {
        let status = self.status()?;
        if status == RpcResultStatus::Success {
            return Ok(self.payload);
        }
        match status.to_failure(operation, facet, self.payload) {
            Some(failure) => Err(failure),
            None => Ok(Vec::new()),
        }
    }
}
