// SPDX-License-Identifier: MIT

//! External source bridge.
//!
//! Pulls challenge entries from the external table, classifies their
//! media, and promotes them into first-class challenges, flipping each
//! row's sync status on success.

use std::sync::Arc;

use crate::error::{Result, SyncError};
use crate::models::{ChallengeMedia, MediaType};
use crate::repos::{ChallengeRepo, NewChallenge};
use crate::services::airtable::{AirtableClient, AirtableRow, ExternalChallengeRecord};
use crate::services::media::{self, ClassifyMedia, MediaKind};

/// Result of a bulk fetch: decodable records plus one descriptor per
/// row that could not be decoded.
#[derive(Debug)]
pub struct FetchOutcome {
    pub records: Vec<ExternalChallengeRecord>,
    pub irretrievable: Vec<String>,
}

/// Summary of a full sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Ids of newly created challenges
    pub promoted: Vec<String>,
    /// Per-record promotion failures
    pub failed: Vec<String>,
    /// Rows that could not be decoded at all
    pub irretrievable: Vec<String>,
}

pub struct SyncService {
    airtable: AirtableClient,
    classifier: Arc<dyn ClassifyMedia>,
    challenges: ChallengeRepo,
}

impl SyncService {
    pub fn new(
        airtable: AirtableClient,
        classifier: Arc<dyn ClassifyMedia>,
        challenges: ChallengeRepo,
    ) -> Self {
        Self {
            airtable,
            classifier,
            challenges,
        }
    }

    /// Fetch and decode every row. Rows are decoded independently: a
    /// failing row is reported as "recordId – missingFieldName" and
    /// processing continues with the rest.
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let rows = self.airtable.list_records().await?;
        let outcome = decode_rows(&rows);

        tracing::info!(
            fetched = rows.len(),
            decoded = outcome.records.len(),
            irretrievable = outcome.irretrievable.len(),
            "Fetched external challenge entries"
        );
        Ok(outcome)
    }

    /// Promote one record into a challenge and mark the row synced.
    ///
    /// Media is classified first; an unrecognized type fails the whole
    /// promotion before anything is written, so no partial challenge
    /// is ever created. A
    /// recognized linked video gets its link replaced by the normalized
    /// embeddable form. If the status flip fails after the challenge
    /// was created, the challenge stays and the error carries its id.
    pub async fn promote(&self, record: &ExternalChallengeRecord) -> Result<String> {
        let kind = self.classifier.classify(&record.media_link).await?;

        let (media_type, link) = match kind {
            MediaKind::Gif => (MediaType::Gif, record.media_link.clone()),
            MediaKind::Image => (MediaType::StaticImage, record.media_link.clone()),
            MediaKind::Video => {
                let embed = media::normalize_embed(&record.media_link).ok_or_else(|| {
                    SyncError::Classification(SyncError::INVALID_MEDIA_TYPE.to_string())
                })?;
                (MediaType::LinkedVideo, embed.to_string())
            }
            MediaKind::Other => {
                return Err(SyncError::Classification(
                    SyncError::INVALID_MEDIA_TYPE.to_string(),
                ))
            }
        };

        let challenge = self
            .challenges
            .create_challenge(NewChallenge {
                title: record.title.clone(),
                prompt: record.prompt.clone(),
                point_value: record.point_value,
                media: Some(ChallengeMedia {
                    link,
                    storage_path: None,
                    kind: media_type,
                }),
            })
            .await?;

        if let Err(err) = self.airtable.mark_synced(&record.record_id).await {
            return Err(SyncError::Consistency {
                message: format!(
                    "Challenge {} created but marking record {} synced failed: {err}",
                    challenge.id, record.record_id
                ),
                created_id: Some(challenge.id),
            });
        }

        tracing::info!(
            record_id = %record.record_id,
            challenge_id = %challenge.id,
            "Promoted external record"
        );
        Ok(challenge.id)
    }

    /// Full pass: fetch everything and promote every row not yet
    /// marked up to date. Failures are collected per record; siblings
    /// keep processing.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let fetched = self.fetch_all().await?;

        let mut report = SyncReport {
            irretrievable: fetched.irretrievable,
            ..Default::default()
        };
        for record in fetched.records.iter().filter(|r| !r.up_to_date) {
            match self.promote(record).await {
                Ok(challenge_id) => report.promoted.push(challenge_id),
                Err(err) => report.failed.push(format!("{} – {}", record.record_id, err)),
            }
        }

        tracing::info!(
            promoted = report.promoted.len(),
            failed = report.failed.len(),
            "Sync pass complete"
        );
        Ok(report)
    }
}

/// Decode each raw row independently, collecting failures instead of
/// aborting the batch.
fn decode_rows(rows: &[AirtableRow]) -> FetchOutcome {
    let mut outcome = FetchOutcome {
        records: Vec::with_capacity(rows.len()),
        irretrievable: vec![],
    };
    for row in rows {
        match ExternalChallengeRecord::decode(row) {
            Ok(record) => outcome.records.push(record),
            Err(err) => {
                let field = err.missing_field().unwrap_or("record");
                outcome.irretrievable.push(format!("{} – {}", row.id, field));
            }
        }
    }
    outcome
}
