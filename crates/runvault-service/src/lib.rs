//! Runvault Service
//!
//! The result service orchestrates the record codec, merge engine,
//! filter engine, and row store into the five caller-facing operations:
//! create, get, update, delete, and list. List queries combine an
//! adaptive pagination batcher with per-record filter evaluation and
//! opaque continuation tokens.

mod error;
mod pagination;
mod service;
mod token;

pub use error::ServiceError;
pub use pagination::Batcher;
pub use service::{ListRequest, ListResponse, ResultService, ServiceConfig};
pub use token::PageToken;
