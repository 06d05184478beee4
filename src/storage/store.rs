use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{CompatReport, CompatStatus, Persistence, ReportInput, ReportStats};

/// Bounded report store with pair-based identity semantics.
///
/// Every operation reads the full persisted snapshot, mutates it, and
/// writes it back; there is no cross-call transaction. Malformed persisted
/// data degrades to an empty collection rather than surfacing an error,
/// and a failed save leaves the prior snapshot in place while the
/// operation still returns its computed result.
pub struct ReportStore {
    persistence: Arc<dyn Persistence>,
    max_reports: usize,
}

impl ReportStore {
    /// Create a store over the given persistence, retaining at most
    /// `max_reports` entries.
    pub fn new(persistence: Arc<dyn Persistence>, max_reports: usize) -> Self {
        Self {
            persistence,
            max_reports,
        }
    }

    /// The configured retention cap.
    pub fn max_reports(&self) -> usize {
        self.max_reports
    }

    /// Load the current snapshot, degrading to empty on missing or
    /// malformed data.
    async fn load_reports(&self) -> Vec<CompatReport> {
        let bytes = match self.persistence.load().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load reports, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<CompatReport>>(&bytes) {
            Ok(reports) => reports,
            Err(e) => {
                warn!(error = %e, "Malformed report data, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist a snapshot, truncating to the most recent `max_reports`
    /// entries first. Save failures are logged and swallowed.
    async fn save_reports(&self, mut reports: Vec<CompatReport>) {
        if reports.len() > self.max_reports {
            let excess = reports.len() - self.max_reports;
            reports.drain(..excess);
            debug!(evicted = excess, "Retention cap reached, dropped oldest reports");
        }

        let bytes = match serde_json::to_vec(&reports) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "Failed to serialize reports, snapshot not persisted");
                return;
            }
        };

        if let Err(e) = self.persistence.save(&bytes).await {
            warn!(error = %e, "Failed to persist reports, snapshot not saved");
        }
    }

    /// Submit a report. If a report for the same (client_id, server_id)
    /// pair exists, its content is overwritten in place while the id and
    /// vote counts are preserved; the moderation flag is reset.
    pub async fn submit(&self, input: ReportInput) -> CompatReport {
        let mut reports = self.load_reports().await;

        let existing = reports
            .iter()
            .position(|r| r.is_pair(&input.client_id, &input.server_id));

        let report = match existing {
            Some(index) => {
                let prior = &reports[index];
                let mut report = CompatReport::new(input);
                report.id = prior.id.clone();
                report.upvotes = prior.upvotes;
                report.downvotes = prior.downvotes;
                reports[index] = report.clone();
                report
            }
            None => {
                let report = CompatReport::new(input);
                reports.push(report.clone());
                report
            }
        };

        debug!(
            client = %report.client_id,
            server = %report.server_id,
            status = %report.status,
            "Report submitted"
        );

        self.save_reports(reports).await;
        report
    }

    /// All currently retained reports, in insertion/update order.
    pub async fn all(&self) -> Vec<CompatReport> {
        self.load_reports().await
    }

    /// Reports for one (client_id, server_id) pair.
    ///
    /// Under the pair-identity invariant this is 0 or 1 reports, but
    /// imported or legacy data may carry duplicates; callers aggregate
    /// over whatever is returned.
    pub async fn for_pair(&self, client_id: &str, server_id: &str) -> Vec<CompatReport> {
        self.load_reports()
            .await
            .into_iter()
            .filter(|r| r.is_pair(client_id, server_id))
            .collect()
    }

    /// Reports for one client.
    pub async fn for_client(&self, client_id: &str) -> Vec<CompatReport> {
        self.load_reports()
            .await
            .into_iter()
            .filter(|r| r.client_id == client_id)
            .collect()
    }

    /// Reports for one server.
    pub async fn for_server(&self, server_id: &str) -> Vec<CompatReport> {
        self.load_reports()
            .await
            .into_iter()
            .filter(|r| r.server_id == server_id)
            .collect()
    }

    /// Increment the upvote count on a report. `None` if the id is
    /// unknown.
    pub async fn upvote(&self, id: &str) -> Option<CompatReport> {
        self.cast_vote(id, true).await
    }

    /// Increment the downvote count on a report. `None` if the id is
    /// unknown.
    pub async fn downvote(&self, id: &str) -> Option<CompatReport> {
        self.cast_vote(id, false).await
    }

    async fn cast_vote(&self, id: &str, upvote: bool) -> Option<CompatReport> {
        let mut reports = self.load_reports().await;

        let report = reports.iter_mut().find(|r| r.id == id)?;
        if upvote {
            report.upvotes += 1;
        } else {
            report.downvotes += 1;
        }
        let voted = report.clone();

        self.save_reports(reports).await;
        Some(voted)
    }

    /// Remove every retained report. Administrative operation; there is no
    /// soft delete.
    pub async fn clear(&self) {
        self.save_reports(Vec::new()).await;
    }

    /// Summary statistics over the retained collection.
    pub async fn stats(&self) -> ReportStats {
        let reports = self.load_reports().await;

        let mut stats = ReportStats {
            total: reports.len(),
            ..ReportStats::default()
        };

        for report in &reports {
            match report.status {
                CompatStatus::Works => stats.by_status.works += 1,
                CompatStatus::Partial => stats.by_status.partial += 1,
                CompatStatus::Broken => stats.by_status.broken += 1,
                CompatStatus::Unknown => stats.by_status.unknown += 1,
            }
            *stats.by_client.entry(report.client_id.clone()).or_insert(0) += 1;
            *stats.by_server.entry(report.server_id.clone()).or_insert(0) += 1;
            if report.verified {
                stats.verified += 1;
            }
        }

        stats
    }

    /// Serialize the retained collection as pretty-printed JSON.
    pub async fn export(&self) -> String {
        let reports = self.load_reports().await;
        serde_json::to_string_pretty(&reports).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to serialize reports for export");
            "[]".to_string()
        })
    }

    /// Merge a serialized report collection into the store.
    ///
    /// Entries whose id already exists are skipped; entries missing id,
    /// client_id, server_id, or a parseable status are silently dropped.
    /// Returns the number of entries merged in; unparseable input yields
    /// 0 rather than an error.
    pub async fn import(&self, json: &str) -> usize {
        let entries: Vec<Value> = match serde_json::from_str(json) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to parse import payload");
                return 0;
            }
        };

        let mut reports = self.load_reports().await;
        let existing_ids: std::collections::HashSet<String> =
            reports.iter().map(|r| r.id.clone()).collect();

        let mut accepted = 0;
        for entry in entries {
            let report = match serde_json::from_value::<CompatReport>(entry) {
                Ok(report) => report,
                Err(e) => {
                    debug!(error = %e, "Dropping malformed import entry");
                    continue;
                }
            };
            if report.id.is_empty() || report.client_id.is_empty() || report.server_id.is_empty() {
                continue;
            }
            if existing_ids.contains(&report.id) {
                continue;
            }
            reports.push(report);
            accepted += 1;
        }

        if accepted > 0 {
            self.save_reports(reports).await;
        }
        accepted
    }
}
