// SPDX-License-Identifier: MIT

//! Services: external source bridge and media classification.

pub mod airtable;
pub mod media;
pub mod sync;

pub use airtable::{AirtableClient, AirtableRow, ExternalChallengeRecord};
pub use media::{ClassifyMedia, MediaClassifier, MediaKind};
pub use sync::{FetchOutcome, SyncReport, SyncService};
