//! Trend analysis
//!
//! Compares the two most recent measurements of a newest-first history and
//! reports, per metric, the signed change, the percentage change relative
//! to the previous value and whether the change counts as an improvement.

use crate::config::{EngineConfig, TrendConfig, TrendPolarityMode};
use crate::metric::{Metric, Polarity};
use crate::types::{Goal, Measurement, TrendDirection, TrendEntry, TrendResult};
use std::collections::BTreeMap;

/// Analyzer comparing the latest measurement with its predecessor
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.trend.clone())
    }

    /// Trend with the default verdict (a decrease is an improvement)
    pub fn analyze(&self, history: &[Measurement]) -> TrendResult {
        self.analyze_for_goal(history, Goal::Maintain)
    }

    /// Trend whose verdict may depend on the client's goal when the
    /// analyzer runs in goal-aware mode
    pub fn analyze_for_goal(&self, history: &[Measurement], goal: Goal) -> TrendResult {
        let (latest, previous) = match history {
            [latest, previous, ..] => (latest, previous),
            _ => {
                return TrendResult::InsufficientData {
                    measurements: history.len(),
                }
            }
        };

        let metrics: BTreeMap<Metric, TrendEntry> = Metric::ALL
            .iter()
            .filter_map(|metric| {
                let current = latest.value(*metric)?;
                let before = previous.value(*metric)?;
                Some((*metric, self.entry(*metric, current, before, goal)))
            })
            .collect();

        TrendResult::Computed {
            latest_date: latest.date(),
            previous_date: previous.date(),
            metrics,
        }
    }

    fn entry(&self, metric: Metric, current: f64, before: f64, goal: Goal) -> TrendEntry {
        let delta = current - before;
        let percentage_change = if before == 0.0 {
            None
        } else {
            Some(delta / before * 100.0)
        };

        let direction = if delta.abs() < self.config.stable_threshold {
            TrendDirection::Stable
        } else if delta > 0.0 {
            TrendDirection::Increased
        } else {
            TrendDirection::Decreased
        };

        TrendEntry {
            delta,
            percentage_change,
            direction,
            improved: self.improved(metric, direction, goal),
        }
    }

    fn improved(&self, metric: Metric, direction: TrendDirection, goal: Goal) -> bool {
        if metric.polarity() == Polarity::Neutral {
            return false;
        }

        let gaining = self.config.polarity == TrendPolarityMode::GoalAware
            && goal == Goal::Gain
            && matches!(metric, Metric::Weight | Metric::Bmi);

        if gaining {
            direction == TrendDirection::Increased
        } else {
            direction == TrendDirection::Decreased
        }
    }
}
