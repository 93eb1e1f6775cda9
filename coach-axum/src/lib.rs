//! coach-axum: Axum adapter for the coach service.
//!
//! Serves any [`coach_core::CoachApi`] over HTTP:
//!
//! | Route | Operation |
//! |---|---|
//! | `POST /coaches` | `create` (multipart: `coach` JSON part, `photo` parts) |
//! | `PUT /coaches` | `update` (multipart) |
//! | `GET /coaches` | `find` |
//! | `GET /coaches/aggregated` | `find_aggregated` |
//! | `GET /coaches/{id}` | `get` |
//! | `DELETE /coaches/{id}` | `remove` |
//! | `GET /health` | liveness |
//!
//! Errors are returned as `{name, message, code, className}` with the mapped
//! status code.

pub mod app;
mod error;
pub mod multipart;
pub mod rest;
mod state;

pub use app::CoachAxumApp;
pub use error::CoachAxumError;
pub use state::CoachAxumState;

pub use axum;
