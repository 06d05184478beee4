use serde::{Deserialize, Serialize};

use crate::storage::{CompatReport, CompatStatus};

/// Weighted consensus over one pair's reports. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatus {
    /// The winning status bucket.
    pub status: CompatStatus,
    /// Percentage share of total weighted votes held by the winner
    /// (0-100).
    pub confidence: f64,
    /// Number of reports aggregated.
    pub report_count: usize,
}

impl AggregateStatus {
    /// The empty aggregate: no reports, no judgment.
    pub fn empty() -> Self {
        Self {
            status: CompatStatus::Unknown,
            confidence: 0.0,
            report_count: 0,
        }
    }
}

/// Weight of a single report: never below 1, growing with net upvotes.
///
/// The floor keeps a heavily-downvoted report from having zero or
/// negative influence, which could otherwise drain another bucket's
/// total through subtraction.
fn report_weight(report: &CompatReport) -> u64 {
    let net = 1 + i64::from(report.upvotes) - i64::from(report.downvotes);
    net.max(1) as u64
}

/// Bucket position of a status in the fixed tally order.
fn bucket_index(status: CompatStatus) -> usize {
    match status {
        CompatStatus::Works => 0,
        CompatStatus::Partial => 1,
        CompatStatus::Broken => 2,
        CompatStatus::Unknown => 3,
    }
}

/// Compute the weighted consensus for a set of reports.
///
/// Each report adds its weight to the bucket matching its status. The
/// winner is the strictly greatest bucket in the fixed order
/// [`CompatStatus::ALL`]; on a tie the earlier bucket wins, keeping the
/// result deterministic.
pub fn aggregate<'a, I>(reports: I) -> AggregateStatus
where
    I: IntoIterator<Item = &'a CompatReport>,
{
    let mut buckets = [0u64; CompatStatus::ALL.len()];
    let mut report_count = 0usize;

    for report in reports {
        buckets[bucket_index(report.status)] += report_weight(report);
        report_count += 1;
    }

    if report_count == 0 {
        return AggregateStatus::empty();
    }

    let total: u64 = buckets.iter().sum();
    let mut winner = 0;
    for (index, weight) in buckets.iter().enumerate() {
        if *weight > buckets[winner] {
            winner = index;
        }
    }

    AggregateStatus {
        status: CompatStatus::ALL[winner],
        confidence: (buckets[winner] as f64 / total as f64) * 100.0,
        report_count,
    }
}
