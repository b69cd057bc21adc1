use std::sync::atomic::{AtomicU32, Ordering};

/// Request id carried by one-way requests, which never get a reply.
pub const ONE_WAY_REQUEST_ID: u32 = 0;

/// A process-wide counter for two-way request ids, initialized at 1.
static REQUEST_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Returns the next two-way request id, skipping `ONE_WAY_REQUEST_ID` when
/// the counter wraps.
#[inline]
pub fn next_request_id() -> u32 {
    loop {
        let id = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        if id != ONE_WAY_REQUEST_ID {
            return id;
        }
    }
}
