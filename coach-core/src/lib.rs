//! coach-core: transport-agnostic core for the coach service.
//!
//! Holds the domain models, the error taxonomy, the key/value configuration
//! store and the traits every collaborator (relational store, remote
//! directories, exposed API) is expressed through.

pub mod config;
pub mod errors;
pub mod memory;
pub mod models;
pub mod remote;
pub mod repository;
pub mod service;
pub mod stream;

pub use config::{CoachConfig, CoachConfigSnapshot};
pub use errors::{CoachError, CoachResult, ErrorKind, Severity};
pub use memory::MemoryCoachRepository;
pub use models::{
    AggregatedCoachView, Coach, CoachWithServices, CreateCoachFields, ReviewRef, ReviewWithUser,
    ServiceRef, StructuredPayload, UpdateCoachFields, UserRef,
};
pub use remote::{ReviewDirectory, ReviewsByCoach, ServiceDirectory, ServicesByCoach, UserDirectory, UsersById};
pub use repository::{CoachRepository, UpdateCoachCommand};
pub use service::CoachApi;
pub use stream::{ChunkStream, CoachChunk};
