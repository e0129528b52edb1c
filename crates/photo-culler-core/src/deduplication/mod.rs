//! Exact and near-duplicate detection over a candidate set.
//!
//! Exact duplicates share a content digest; the earliest photo of each group
//! is kept and the rest are marked. Near duplicates are pairs whose
//! fingerprints differ in fewer than `similarity_threshold` bits; of each such
//! pair the worse one (higher score) is marked. Marked photos are what the
//! selection step surfaces first.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::ClusterConfig;
use crate::processing::ContentDigest;
use crate::types::{AssetId, ScoredPhoto, SelectionReason};

/// Why a candidate was marked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mark {
    ExactDuplicate { of: AssetId },
    NearDuplicate { of: AssetId, distance: u32 },
}

impl From<Mark> for SelectionReason {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::ExactDuplicate { of } => SelectionReason::ExactDuplicate { of },
            Mark::NearDuplicate { of, distance } => SelectionReason::NearDuplicate { of, distance },
        }
    }
}

/// Byte-identical photos: one kept, the rest marked
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactGroup {
    pub digest: ContentDigest,
    pub keeper: AssetId,
    pub duplicates: Vec<AssetId>,
}

/// Outcome of clustering, indexed like the input slice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterReport {
    pub marks: Vec<Option<Mark>>,
    /// Score each candidate competes with during selection
    pub effective_scores: Vec<f64>,
    /// Groups in order of first appearance
    pub exact_groups: Vec<ExactGroup>,
}

impl ClusterReport {
    pub fn mark(&self, index: usize) -> Option<&Mark> {
        self.marks.get(index).and_then(Option::as_ref)
    }

    pub fn marked_count(&self) -> usize {
        self.marks.iter().filter(|m| m.is_some()).count()
    }
}

/// Groups exact duplicates and links near duplicates
#[derive(Debug, Clone, Default)]
pub struct DuplicateClusterer {
    config: ClusterConfig,
}

impl DuplicateClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster `photos` in their given order. Deterministic for a given input.
    pub fn cluster(&self, photos: &[ScoredPhoto]) -> ClusterReport {
        let mut marks: Vec<Option<Mark>> = vec![None; photos.len()];

        let exact_groups = self.mark_exact_duplicates(photos, &mut marks);
        self.mark_near_duplicates(photos, &mut marks);

        let effective_scores = photos
            .iter()
            .zip(&marks)
            .map(|(photo, mark)| match mark {
                Some(Mark::ExactDuplicate { .. }) => self.config.duplicate_score,
                _ => photo.score,
            })
            .collect();

        ClusterReport {
            marks,
            effective_scores,
            exact_groups,
        }
    }

    fn mark_exact_duplicates(
        &self,
        photos: &[ScoredPhoto],
        marks: &mut [Option<Mark>],
    ) -> Vec<ExactGroup> {
        // Group by digest, remembering first appearance for a stable order
        let mut order: Vec<ContentDigest> = Vec::new();
        let mut by_digest: HashMap<ContentDigest, Vec<usize>> = HashMap::new();
        for (index, photo) in photos.iter().enumerate() {
            let digest = photo.features.digest;
            by_digest
                .entry(digest)
                .or_insert_with(|| {
                    order.push(digest);
                    Vec::new()
                })
                .push(index);
        }

        let mut groups = Vec::new();
        for digest in order {
            let members = &by_digest[&digest];
            if members.len() < 2 {
                continue;
            }

            // Earliest capture wins; equal timestamps fall back to input order
            let keeper = members
                .iter()
                .copied()
                .min_by_key(|&i| (photos[i].asset.created_at, i))
                .unwrap_or(members[0]);
            let keeper_id = photos[keeper].id().clone();

            let mut duplicates = Vec::with_capacity(members.len() - 1);
            for &i in members.iter().filter(|&&i| i != keeper) {
                marks[i] = Some(Mark::ExactDuplicate {
                    of: keeper_id.clone(),
                });
                duplicates.push(photos[i].id().clone());
            }

            groups.push(ExactGroup {
                digest,
                keeper: keeper_id,
                duplicates,
            });
        }

        groups
    }

    /// Single pass over unmarked pairs (i < j). O(n²).
    fn mark_near_duplicates(&self, photos: &[ScoredPhoto], marks: &mut [Option<Mark>]) {
        let threshold = self.config.similarity_threshold;

        for i in 0..photos.len() {
            if marks[i].is_some() {
                continue;
            }

            for j in (i + 1)..photos.len() {
                if marks[j].is_some() {
                    continue;
                }

                let fp_i = photos[i].features.fingerprint;
                let fp_j = photos[j].features.fingerprint;
                if !fp_i.is_similar(&fp_j, threshold) {
                    continue;
                }

                // Higher score is worse; on a tie the later photo goes
                let (marked, kept) = if photos[i].score > photos[j].score {
                    (i, j)
                } else {
                    (j, i)
                };
                marks[marked] = Some(Mark::NearDuplicate {
                    of: photos[kept].id().clone(),
                    distance: fp_i.distance(&fp_j),
                });

                if marked == i {
                    break;
                }
            }
        }
    }
}
