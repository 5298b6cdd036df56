//! Completion statistics for version classification.

use serde::{Deserialize, Serialize};

use crate::types::{BuildStatus, VersionTier};
use super::v1::VersionPolicyV1;

/// Completed-versus-total counts for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionStats {
    /// Components with status `completed`.
    pub completed: usize,
    /// All components in the package.
    pub total: usize,
}

impl CompletionStats {
    /// Create stats from explicit counts.
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Count completed statuses.
    pub fn from_statuses<I: IntoIterator<Item = BuildStatus>>(statuses: I) -> Self {
        statuses.into_iter().fold(Self::default(), |mut stats, status| {
            stats.total += 1;
            if status.is_completed() {
                stats.completed += 1;
            }
            stats
        })
    }

    /// Completion ratio, or `None` for an empty package.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.completed as f64 / self.total as f64)
        }
    }

    /// Tier for these stats, or `None` for an empty package.
    pub fn tier(&self, policy: &VersionPolicyV1) -> Option<VersionTier> {
        self.ratio().map(|ratio| policy.classify(ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_statuses() {
        let stats = CompletionStats::from_statuses([
            BuildStatus::Completed,
            BuildStatus::InProgress,
            BuildStatus::Pending,
            BuildStatus::Completed,
        ]);
        assert_eq!(stats, CompletionStats::new(2, 4));
        assert_eq!(stats.ratio(), Some(0.5));
    }

    #[test]
    fn test_empty_has_no_ratio() {
        let stats = CompletionStats::from_statuses(std::iter::empty());
        assert_eq!(stats.ratio(), None);
        assert_eq!(stats.tier(&VersionPolicyV1::default()), None);
    }

    #[test]
    fn test_in_progress_does_not_count() {
        let policy = VersionPolicyV1::default();
        // 4 completed + 1 in progress = 0.8 → release
        let stats = CompletionStats::new(4, 5);
        assert_eq!(stats.tier(&policy), Some(VersionTier::Release));
        // 3 completed + 2 in progress = 0.6 → alpha
        let stats = CompletionStats::from_statuses([
            BuildStatus::Completed,
            BuildStatus::Completed,
            BuildStatus::Completed,
            BuildStatus::InProgress,
            BuildStatus::InProgress,
        ]);
        assert_eq!(stats.tier(&policy), Some(VersionTier::Alpha));
    }
}
