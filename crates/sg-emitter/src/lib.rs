//! # sg-emitter
//!
//! Renders [`ClassPlan`](sg_core::ClassPlan)s into Java source for the
//! Vert.x runtime. Each shim captures the caller's context, calls the
//! delegate's asynchronous variant and completes a promise back on that
//! context.

pub mod builder;
pub mod config;
pub mod emitter;

pub use builder::JavaSourceBuilder;
pub use config::EmitterConfig;
pub use emitter::ShimEmitter;
