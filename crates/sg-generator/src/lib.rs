//! # sg-generator
//!
//! Keeps an asynchronous Vert.x wrapper in sync with a synchronous client
//! class. Reads the client's source, pairs each blocking method with its
//! callback-based variant and writes one shim class per client.
//!
//! # Usage
//!
//! ```bash
//! sg-generate path/to/RestHighLevelClient.java build/generated io.reactiverse.opensearch.client
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SourceUnit  │ ──> │  sg-parser  │ ──> │ sg-analyzer │ ──> │ sg-emitter  │
//! │   (load)    │     │             │     │  ClassPlan  │     │    .java    │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └──────┬──────┘
//!        ▲                                       │                   │
//!        └──────── nested clients ───────────────┘                   ▼
//!                                                            staged write
//! ```

pub mod cli;
pub mod config;
pub mod generator;
mod output;

pub use config::{GeneratorConfig, DEFAULT_NAMESPACE};
pub use generator::{
    validate_namespace, GeneratorError, RunReport, ShimGenerator, UnitReport, WriteStatus,
};
