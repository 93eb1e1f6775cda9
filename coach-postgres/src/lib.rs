//! coach-postgres: PostgreSQL implementation of [`CoachRepository`].
//!
//! Expects a `coach` table:
//!
//! ```sql
//! CREATE TABLE "coach" (
//!     id           UUID PRIMARY KEY,
//!     name         TEXT NOT NULL,
//!     description  TEXT NOT NULL,
//!     photo        TEXT NOT NULL DEFAULT '',
//!     created_time TIMESTAMPTZ NOT NULL,
//!     updated_time TIMESTAMPTZ NOT NULL
//! );
//! ```

mod repository;

pub use repository::PgCoachRepository;

pub use coach_core::CoachRepository;
