//! dayplan - Day Timeline Task Manager Library
//!
//! This library provides the core functionality for the dayplan CLI tool:
//! timed tasks on a 24-hour day, persisted as a tolerant JSON store and
//! manipulated from a terminal timeline.
//!
//! # Core Concepts
//!
//! - **Tasks**: Named intervals with a start and end timestamp
//! - **Storage**: Single-file JSON store with versioned record migration
//! - **Geometry**: Time-to-row math for the timeline column, with snapping
//! - **Drag**: Explicit state machine for move and resize gestures
//! - **Day View**: Interactive ratatui timeline with mouse support
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `dayplan.toml`
//! - `drag`: Drag controller state machine
//! - `error`: Error types and result aliases
//! - `events`: JSONL change events for external integrations
//! - `geometry`: Timeline geometry and day-bound clipping
//! - `output`: CLI output formatting (human and JSON)
//! - `storage`: Task store persistence and migration
//! - `task`: Task records and the in-memory collection
//! - `ui`: Terminal day view

pub mod cli;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod geometry;
pub mod output;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
