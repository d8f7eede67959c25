//! # resync-sync
//!
//! Reconciles an implementation package against its contract interfaces and
//! writes the result back.
//!
//! Call [`pipeline::run`] for a full cycle, [`pipeline::plan`] to compute
//! the same changes without writing, or [`pipeline::diff`] for unified
//! diffs of what a run would change.

pub mod compare;
pub mod diff;
pub mod error;
pub mod formatter;
pub mod naming;
pub mod pipeline;
pub mod reconcile;
pub mod writer;

pub use diff::FileDiff;
pub use error::{FormatError, SyncError, WriteError};
pub use formatter::{CommandFormatter, Formatter, NoopFormatter};
pub use naming::Naming;
pub use pipeline::{formatter_for, Plan, SyncReport};
pub use reconcile::{Action, ActionKind, ReconcileOptions, Reconciler, Reconciliation};
pub use writer::{PlannedFile, WriteResult};
