//! issuehook trigger listener.
//!
//! Binds the HTTP endpoint the issue tracker calls to start a job:
//!
//! ```text
//! POST /job/{job}/jji/build
//! Authorization: Bearer <token>
//!
//! {"by": "alice", "issueKey": "ABC-1", "issueUrl": "...", "parameters": [{"name": "branch", "value": "main"}]}
//! ```
//!
//! | Outcome | Status |
//! |---------|--------|
//! | Run queued | 201 |
//! | Job not eligible to run | 406 |
//! | Malformed payload | 400 |
//! | Missing or wrong token | 401 |
//! | Unknown job | 404 |
//! | Execution host unavailable | 500, then the server stops |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, authentication, and status mapping live
//! here. The [`trigger`] crate sees only its own traits and a decoded body.

pub mod auth;
pub mod error;
pub mod fault;
pub mod server;

pub use auth::{SharedSecretVerifier, TokenVerifier};
pub use error::ListenerError;
pub use fault::FaultSignal;
pub use server::{router, serve, AppState, TRIGGER_PATH};
