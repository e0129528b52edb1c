//! Badness score: how deletable a photo looks from its features alone.
//!
//! The score is a sum of independent penalties, clamped to [0, 100]. Each rule
//! only ever pushes the score in one direction for its input, so a blurrier,
//! darker, flatter or more document-like photo never scores lower.

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::processing::scorers::NEUTRAL_AESTHETIC;
use crate::processing::FeatureSet;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Which rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    Blurry,
    DarkLowDetail,
    Dark,
    Document,
    FacelessLowDetail,
    Aesthetic,
}

/// One applied rule and its contribution (negative for a bonus)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Penalty {
    pub kind: PenaltyKind,
    pub points: f64,
}

/// Deterministic feature → score function
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Every rule that applies to `features`, in a fixed order
    pub fn explain(&self, features: &FeatureSet) -> Vec<Penalty> {
        let c = &self.config;
        let mut penalties = Vec::new();
        let mut push = |kind, points: f64| {
            if points != 0.0 {
                penalties.push(Penalty { kind, points });
            }
        };

        if features.blur < c.blur_threshold {
            push(PenaltyKind::Blurry, c.blur_penalty);
        }

        let low_detail = features.entropy < c.low_entropy;
        if features.luminance < c.dark_luminance {
            if low_detail {
                push(PenaltyKind::DarkLowDetail, c.dark_low_detail_penalty);
            } else {
                push(PenaltyKind::Dark, c.dark_penalty);
            }
        }

        if features.edge_density > c.document_edge_density {
            push(PenaltyKind::Document, c.document_penalty);
        }

        if features.face_count == 0 && low_detail {
            push(PenaltyKind::FacelessLowDetail, c.faceless_low_detail_penalty);
        }

        let quality = if features.aesthetic.is_finite() {
            features.aesthetic.clamp(0.0, 1.0)
        } else {
            NEUTRAL_AESTHETIC
        };
        push(
            PenaltyKind::Aesthetic,
            (NEUTRAL_AESTHETIC - quality) * c.aesthetic_weight,
        );

        penalties
    }

    /// Badness score in [0, 100]; never fails
    pub fn score(&self, features: &FeatureSet) -> f64 {
        let total: f64 = self.explain(features).iter().map(|p| p.points).sum();
        if total.is_finite() {
            total.clamp(MIN_SCORE, MAX_SCORE)
        } else {
            MIN_SCORE
        }
    }
}
