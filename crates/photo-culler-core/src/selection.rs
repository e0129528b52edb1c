//! Top-K deletion candidates.
//!
//! Candidates are the table minus excluded and already-seen ids, in table
//! order. Duplicates marked by the clusterer come first in the sense that
//! they are always eligible; if there are fewer than K of them, the
//! highest-scoring unmarked photos fill the remaining slots. The final list
//! is ordered by effective score, descending, ties by table order.

use log::debug;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::deduplication::DuplicateClusterer;
use crate::types::{AssetId, ScoredPhoto, SelectedPhoto, SelectionReason, SelectionResult};

struct Pick {
    index: usize,
    score: f64,
    reason: SelectionReason,
}

/// Descending score, then ascending table position
fn by_score_desc(a_score: f64, a_index: usize, b_score: f64, b_index: usize) -> Ordering {
    b_score.total_cmp(&a_score).then(a_index.cmp(&b_index))
}

/// Choose up to `k` candidates from `photos`. Pure: recording the result as
/// seen is the caller's job.
pub fn select(
    photos: &[ScoredPhoto],
    seen: &HashSet<AssetId>,
    excluded: &[AssetId],
    k: usize,
    clusterer: &DuplicateClusterer,
) -> SelectionResult {
    if k == 0 {
        return SelectionResult::default();
    }

    let excluded: HashSet<&AssetId> = excluded.iter().collect();
    let candidates: Vec<ScoredPhoto> = photos
        .iter()
        .filter(|p| !seen.contains(p.id()) && !excluded.contains(p.id()))
        .cloned()
        .collect();

    if candidates.is_empty() {
        return SelectionResult::default();
    }

    let report = clusterer.cluster(&candidates);

    let mut picks: Vec<Pick> = Vec::with_capacity(k);
    let mut unmarked: Vec<usize> = Vec::new();
    for (index, mark) in report.marks.iter().enumerate() {
        match mark {
            Some(mark) => picks.push(Pick {
                index,
                score: report.effective_scores[index],
                reason: mark.clone().into(),
            }),
            None => unmarked.push(index),
        }
    }

    debug!(
        "Selecting {} from {} candidates ({} duplicates, {} exact groups)",
        k,
        candidates.len(),
        picks.len(),
        report.exact_groups.len()
    );

    if picks.len() < k {
        unmarked.sort_by(|&a, &b| {
            by_score_desc(report.effective_scores[a], a, report.effective_scores[b], b)
        });
        let fill = k - picks.len();
        picks.extend(unmarked.into_iter().take(fill).map(|index| Pick {
            index,
            score: report.effective_scores[index],
            reason: SelectionReason::LowQuality,
        }));
    }

    picks.sort_by(|a, b| by_score_desc(a.score, a.index, b.score, b.index));
    picks.truncate(k);

    let photos = picks
        .into_iter()
        .map(|pick| SelectedPhoto {
            photo: candidates[pick.index].with_score(pick.score),
            reason: pick.reason,
        })
        .collect();

    SelectionResult { photos }
}
