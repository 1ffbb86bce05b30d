//! Models Module
//!
//! Request and response DTOs for the HTTP front end.

mod requests;
mod responses;

pub use requests::{SetValueRequest, MAX_TTL_SECS};
pub use responses::{
    DeleteResponse, ErrorResponse, HealthResponse, SetResponse, SignRangeResponse,
    SignResponse, SignStatusResponse, ValueResponse,
};
