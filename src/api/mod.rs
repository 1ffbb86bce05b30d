//! API Module
//!
//! HTTP handlers and routing for the cache proxy and check-in tracker.
//!
//! # Endpoints
//! - `GET /cache/:alias/:key` - Read a namespaced value, decoded
//! - `PUT /cache/:alias/:key` - Store a JSON value
//! - `DELETE /cache/:alias/:key` - Delete a namespaced key
//! - `POST /checkin/:user_id` - Check in for today
//! - `GET /checkin/:user_id` - Today's status
//! - `GET /checkin/:user_id/week` - This week's bits and total
//! - `GET /checkin/:user_id/month` - This month's bits and total
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
