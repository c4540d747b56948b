//! Maintenance strategies and per-strategy bookkeeping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// The three competing maintenance strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    /// Unplanned corrective maintenance (UnCoMa): repair after a failure
    Corrective,
    /// Calendar-based maintenance (CaBaMa): recurring scheduled action
    Calendar,
    /// Condition-based maintenance (CoBaMa): action on a degradation alarm
    Condition,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Corrective, Strategy::Calendar, Strategy::Condition];

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Corrective => "UnCoMa",
            Strategy::Calendar => "CaBaMa",
            Strategy::Condition => "CoBaMa",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per strategy, indexable by [`Strategy`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerStrategy<T> {
    pub corrective: T,
    pub calendar: T,
    pub condition: T,
}

impl<T> PerStrategy<T> {
    pub fn new(corrective: T, calendar: T, condition: T) -> Self {
        Self {
            corrective,
            calendar,
            condition,
        }
    }

    /// Iterate `(strategy, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Strategy, &T)> {
        Strategy::ALL.into_iter().map(move |s| (s, &self[s]))
    }
}

impl<T> Index<Strategy> for PerStrategy<T> {
    type Output = T;

    fn index(&self, strategy: Strategy) -> &T {
        match strategy {
            Strategy::Corrective => &self.corrective,
            Strategy::Calendar => &self.calendar,
            Strategy::Condition => &self.condition,
        }
    }
}

impl<T> IndexMut<Strategy> for PerStrategy<T> {
    fn index_mut(&mut self, strategy: Strategy) -> &mut T {
        match strategy {
            Strategy::Corrective => &mut self.corrective,
            Strategy::Calendar => &mut self.calendar,
            Strategy::Condition => &mut self.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_strategy_indexing() {
        let mut flags: PerStrategy<bool> = PerStrategy::default();
        flags[Strategy::Calendar] = true;
        assert!(!flags[Strategy::Corrective]);
        assert!(flags.calendar);
        assert_eq!(flags.iter().filter(|(_, v)| **v).count(), 1);
    }
}
