//! Value objects

mod request_id;

pub use request_id::RequestId;
