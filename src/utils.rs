mod next_request_id;
pub use next_request_id::{ONE_WAY_REQUEST_ID, next_request_id};
