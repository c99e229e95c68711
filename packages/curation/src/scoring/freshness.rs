use chrono::{DateTime, Utc};

use crate::error::ScoreError;
use crate::scoring::Scorer;
use crate::types::config::FreshnessConfig;
use crate::types::paper::Paper;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Recency relative to a fixed reference time.
///
/// 1.0 up to `fresh_days`, then linear decay reaching 0.5 at one half-life
/// and 0.0 at two. Future dates count as age zero.
#[derive(Debug, Clone)]
pub struct FreshnessScorer {
    now: DateTime<Utc>,
    fresh_days: f64,
    half_life_days: f64,
}

impl FreshnessScorer {
    pub fn new(config: &FreshnessConfig, now: DateTime<Utc>) -> Self {
        Self {
            now,
            fresh_days: config.fresh_days,
            half_life_days: config.half_life_weeks * 7.0,
        }
    }

    /// Age in fractional days, never negative.
    fn age_days(&self, published: DateTime<Utc>) -> f64 {
        let secs = (self.now - published).num_seconds().max(0) as f64;
        secs / SECONDS_PER_DAY
    }
}

impl Scorer for FreshnessScorer {
    fn name(&self) -> &str {
        "freshness"
    }

    fn score(&self, paper: &Paper) -> Result<f64, ScoreError> {
        let age = self.age_days(paper.published);
        if age <= self.fresh_days {
            return Ok(1.0);
        }
        if self.half_life_days <= 0.0 {
            return Err(ScoreError::Invalid("half-life must be positive".into()));
        }
        Ok((1.0 - age / (2.0 * self.half_life_days)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_paper;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn published(at: DateTime<Utc>) -> Paper {
        let mut paper = test_paper("1");
        paper.published = at;
        paper
    }

    fn scorer() -> FreshnessScorer {
        FreshnessScorer::new(&FreshnessConfig::default(), now())
    }

    #[test]
    fn test_published_now() {
        assert_eq!(scorer().score(&published(now())).unwrap(), 1.0);
        assert_eq!(scorer().score(&published(now() - Duration::hours(23))).unwrap(), 1.0);
    }

    #[test]
    fn test_half_life() {
        let s = scorer().score(&published(now() - Duration::weeks(2))).unwrap();
        assert!((s - 0.5).abs() < 1e-6, "got {}", s);
    }

    #[test]
    fn test_never_negative() {
        let s = scorer().score(&published(now() - Duration::weeks(52))).unwrap();
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_future_date() {
        let s = scorer().score(&published(now() + Duration::days(3))).unwrap();
        assert_eq!(s, 1.0);
    }

    #[test]
    fn test_decays_monotonically() {
        let scorer = scorer();
        let mut last = 1.0;
        for days in 0..40 {
            let s = scorer.score(&published(now() - Duration::days(days))).unwrap();
            assert!(s <= last);
            assert!((0.0..=1.0).contains(&s));
            last = s;
        }
    }
}
