//! # Assetflow Core Library
//!
//! This crate is the core of the assetflow engine: an in-memory registry of
//! physical assets (turbines, solar panels, generic units) combined with a
//! concurrent telemetry pipeline that runs each reading through a
//! validate → analyze → persist → alert sequence.
//!
//! The crate deliberately exposes plain operations rather than a wire
//! protocol: an HTTP or CLI layer is expected to sit on top and call into
//! [`registry::AssetRegistry`] and [`pipeline::TelemetryPipeline`] directly.
//!
//! ## Crate Structure
//!
//! - **`asset`**: the closed set of asset variants, lifecycle status, health
//!   evaluation, and the raw-definition construction boundary.
//! - **`registry`**: the mutex-guarded owner of all assets, with
//!   add/find/remove/bulk-status operations and snapshot reads.
//! - **`telemetry`**: telemetry records and per-record outcomes.
//! - **`pipeline`**: the bounded-concurrency four-stage batch processor.
//! - **`sink`**: the persistence collaborator trait and an in-memory
//!   implementation for demos and tests.
//! - **`config`**: layered configuration loading (TOML + environment).
//! - **`trace`**: structured logging setup on top of `tracing`.
//! - **`error`**: the central `AssetError` enum for the whole crate.

pub mod asset;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod sink;
pub mod telemetry;
pub mod trace;
