use std::collections::BTreeMap;

use super::aggregate::aggregate;
use super::matrix::BaseMatrix;
use crate::storage::{CompatReport, CompatStatus};

/// The effective compatibility view: base matrix cells mapped into the
/// report vocabulary, overridden by high-confidence user consensus.
pub type EffectiveMatrix = BTreeMap<String, BTreeMap<String, CompatStatus>>;

/// Consensus must exceed this share of weighted votes (strictly) to
/// override an editorial judgment.
pub const MERGE_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Blend the base matrix with user consensus.
///
/// The base table is copied, never mutated. For every reported pair the
/// aggregate's winning status replaces the cell when the cell is absent,
/// `unknown`, or the aggregate's confidence is strictly above
/// [`MERGE_CONFIDENCE_THRESHOLD`]. An editorial judgment stands until
/// the user signal is decisive; a gap is filled immediately.
pub fn merge_with_base_matrix(base: &BaseMatrix, reports: &[CompatReport]) -> EffectiveMatrix {
    let mut effective: EffectiveMatrix = base
        .compatibility
        .iter()
        .map(|(client_id, row)| {
            (
                client_id.clone(),
                row.iter()
                    .map(|(server_id, status)| (server_id.clone(), CompatStatus::from(*status)))
                    .collect(),
            )
        })
        .collect();

    for report in reports {
        let pair = aggregate(
            reports
                .iter()
                .filter(|r| r.is_pair(&report.client_id, &report.server_id)),
        );

        let row = effective.entry(report.client_id.clone()).or_default();
        let existing = row.get(&report.server_id);

        if existing.is_none()
            || existing == Some(&CompatStatus::Unknown)
            || pair.confidence > MERGE_CONFIDENCE_THRESHOLD
        {
            row.insert(report.server_id.clone(), pair.status);
        }
    }

    effective
}
