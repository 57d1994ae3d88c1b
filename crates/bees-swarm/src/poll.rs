//! Polling bounds and readiness bookkeeping.

use std::collections::HashSet;
use std::time::Duration;

use bees_cloud::{Instance, InstanceId};

/// Bounds on the wait-for-running loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status queries.
    pub interval: Duration,
    pub max_attempts: u32,
    /// Overall budget measured from the first poll.
    pub deadline: Duration,
    /// Transient provider errors tolerated before giving up.
    pub max_api_errors: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 120,
            deadline: Duration::from_secs(600),
            max_api_errors: 5,
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_max_api_errors(mut self, max_api_errors: u32) -> Self {
        self.max_api_errors = max_api_errors;
        self
    }
}

/// Remembers every bee seen running during one activation.
///
/// Live status can flap; the count reported to the operator never goes
/// down within one activation.
#[derive(Debug, Default)]
pub struct ReadinessTracker {
    seen: HashSet<InstanceId>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one poll result; returns the number of bees seen running so far.
    pub fn observe(&mut self, instances: &[Instance]) -> usize {
        for instance in instances {
            if instance.status.is_running() {
                self.seen.insert(instance.id.clone());
            }
        }
        self.seen.len()
    }

    pub fn ready_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }
}

/// Ids whose status is exactly `running`, keeping input order.
pub fn running_ids(instances: &[Instance]) -> Vec<InstanceId> {
    instances
        .iter()
        .filter(|i| i.status.is_running())
        .map(|i| i.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bees_cloud::InstanceStatus;

    fn inst(id: &str, status: InstanceStatus) -> Instance {
        Instance {
            id: id.to_string(),
            status,
        }
    }

    #[test]
    fn tracker_count_never_decreases() {
        let mut tracker = ReadinessTracker::new();
        let polls = [
            vec![inst("a", InstanceStatus::Pending), inst("b", InstanceStatus::Pending)],
            vec![inst("a", InstanceStatus::Running), inst("b", InstanceStatus::Pending)],
            // "a" flaps back to pending.
            vec![inst("a", InstanceStatus::Pending), inst("b", InstanceStatus::Running)],
            vec![inst("a", InstanceStatus::Running), inst("b", InstanceStatus::Running)],
        ];

        let mut last = 0;
        for poll in &polls {
            let count = tracker.observe(poll);
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 2);
        assert!(tracker.has_seen("a"));
    }

    #[test]
    fn running_ids_filters_and_keeps_order() {
        let instances = vec![
            inst("c", InstanceStatus::Running),
            inst("a", InstanceStatus::Pending),
            inst("b", InstanceStatus::Running),
            inst("d", InstanceStatus::Terminated),
        ];
        assert_eq!(running_ids(&instances), vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn default_policy_is_bounded() {
        let policy = PollPolicy::default();
        assert!(policy.max_attempts > 0);
        assert!(policy.deadline > policy.interval);
    }
}
