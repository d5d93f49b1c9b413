//! quorum: governance proposal analysis core
//!
//! Validates submitted proposal text, asks an external analysis capability
//! for a YES/NO vote recommendation with summary, reasoning and key details,
//! stores the resulting records, and serves per-user history.
//!
//! # Core Concepts
//!
//! - **Proposals**: submitted text, owned by an opaque user id
//! - **Analysis results**: one structured assessment linked to a proposal
//! - **Record store**: authoritative storage behind the `RecordStore` trait
//! - **Analysis gateway**: the external capability behind `AnalysisGateway`
//! - **Orchestrator**: the pipeline tying the above together
//!
//! # Example
//!
//! ```
//! use quorum::{MemoryStore, MockGateway, Orchestrator};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let gateway = Arc::new(MockGateway::scripted());
//! let orchestrator = Orchestrator::new(store, gateway);
//! assert!(orchestrator.history("u1").unwrap().is_empty());
//! ```

pub mod config;
pub mod gateway;
pub mod mcp;
pub mod orchestrator;
mod record;
pub mod storage;

pub use config::{Config, ConfigError};
pub use gateway::{AnalysisGateway, GatewayError, GeminiGateway, MockGateway};
pub use orchestrator::{AnalyzeError, ErrorKind, Orchestrator, Stage, ValidationError};
pub use record::{
    AnalysisResponse, AnalysisResult, Assessment, EntityKind, IdGenerator, KeyDetails,
    NewAnalysisResult, NewProposal, Proposal, Recommendation, RiskLevel,
};
pub use storage::{MemoryStore, RecordStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
