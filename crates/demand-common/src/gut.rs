//! GUT prioritization: severity × urgency × trend.
//!
//! Each factor is an integer in `MIN_SCORE..=MAX_SCORE`. The product ranks
//! demands for display; it never affects card ordering.

use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;
/// Midpoint of the range, used when a factor is not supplied.
pub const DEFAULT_SCORE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GutScores {
    pub severity: i32,
    pub urgency: i32,
    pub trend: i32,
}

impl Default for GutScores {
    fn default() -> Self {
        Self {
            severity: DEFAULT_SCORE,
            urgency: DEFAULT_SCORE,
            trend: DEFAULT_SCORE,
        }
    }
}

impl GutScores {
    pub fn new(severity: i32, urgency: i32, trend: i32) -> Self {
        Self {
            severity,
            urgency,
            trend,
        }
    }

    /// Check every factor against the allowed range, naming the first offender.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("severity", self.severity),
            ("urgency", self.urgency),
            ("trend", self.trend),
        ] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(format!(
                    "{} must be between {} and {}, got {}",
                    name, MIN_SCORE, MAX_SCORE, value
                ));
            }
        }
        Ok(())
    }

    pub fn score(&self) -> i32 {
        self.severity * self.urgency * self.trend
    }

    pub fn tier(&self) -> GutTier {
        GutTier::for_score(self.score())
    }
}

/// Display bucket for a GUT product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GutTier {
    Low,
    Medium,
    High,
    Critical,
}

impl GutTier {
    pub fn for_score(score: i32) -> Self {
        match score {
            s if s >= 64 => Self::Critical,
            s if s >= 27 => Self::High,
            s if s >= 8 => Self::Medium,
            _ => Self::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_midpoint() {
        let gut = GutScores::default();
        assert_eq!(gut, GutScores::new(3, 3, 3));
        assert_eq!(gut.score(), 27);
        assert_eq!(gut.tier(), GutTier::High);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(GutTier::for_score(1), GutTier::Low);
        assert_eq!(GutTier::for_score(7), GutTier::Low);
        assert_eq!(GutTier::for_score(8), GutTier::Medium);
        assert_eq!(GutTier::for_score(26), GutTier::Medium);
        assert_eq!(GutTier::for_score(27), GutTier::High);
        assert_eq!(GutTier::for_score(63), GutTier::High);
        assert_eq!(GutTier::for_score(64), GutTier::Critical);
        assert_eq!(GutTier::for_score(125), GutTier::Critical);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(GutScores::new(1, 5, 3).validate().is_ok());

        let err = GutScores::new(1, 6, 3).validate().unwrap_err();
        assert!(err.contains("urgency"), "got: {}", err);

        let err = GutScores::new(0, 1, 1).validate().unwrap_err();
        assert!(err.contains("severity"), "got: {}", err);
    }

    #[test]
    fn test_tier_serde() {
        assert_eq!(
            serde_json::to_string(&GutTier::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::from_str::<GutTier>("\"medium\"").unwrap(),
            GutTier::Medium
        );
    }
}
