//! # Workflows Module
//!
//! Entry points that tie the engine and core together for one complete request each.
//!
//! - **Field** ([`field`]) - Sample an orbital or a molecular scene, color it and summarize it
//! - **Minimize** ([`minimize`]) - Relax a molecule's geometry under the pair potential
//!
//! Every workflow takes its configuration explicitly, reports through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter) and can be stopped with a
//! [`CancellationToken`](crate::engine::cancel::CancellationToken).

pub mod field;
pub mod minimize;
