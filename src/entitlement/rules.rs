//! Date-versioned rule values.
//!
//! Agreement terms change on fixed dates (the sickness pay period went from
//! 9 to 11 weeks on 2025-05-01). A [`RuleTimeline`] holds every version and
//! resolves the one in force on a date: the most recent `effective_from` on or
//! before it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One version of a rule value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedRule<T> {
    /// First day the value applies.
    pub effective_from: NaiveDate,
    /// The value.
    pub value: T,
}

/// All versions of a rule value, oldest first.
///
/// # Example
///
/// ```
/// use transport_pay_engine::entitlement::{DatedRule, RuleTimeline};
/// use chrono::NaiveDate;
///
/// let weeks = RuleTimeline::new(vec![
///     DatedRule { effective_from: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(), value: 11 },
///     DatedRule { effective_from: NaiveDate::MIN, value: 9 },
/// ]);
///
/// assert_eq!(weeks.value_on(NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()), Some(&9));
/// assert_eq!(weeks.value_on(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()), Some(&11));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTimeline<T> {
    rules: Vec<DatedRule<T>>,
}

impl<T> RuleTimeline<T> {
    /// Builds a timeline, sorting the versions by effective date.
    pub fn new(mut rules: Vec<DatedRule<T>>) -> Self {
        rules.sort_by_key(|rule| rule.effective_from);
        Self { rules }
    }

    /// A timeline with one value in force forever.
    pub fn constant(value: T) -> Self {
        Self {
            rules: vec![DatedRule {
                effective_from: NaiveDate::MIN,
                value,
            }],
        }
    }

    /// The value in force on `date`, if any version has started.
    pub fn value_on(&self, date: NaiveDate) -> Option<&T> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.effective_from <= date)
            .map(|rule| &rule.value)
    }

    /// All versions, oldest first.
    pub fn rules(&self) -> &[DatedRule<T>] {
        &self.rules
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for RuleTimeline<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<DatedRule<T>>::deserialize(deserializer).map(RuleTimeline::new)
    }
}

impl<T: Serialize> Serialize for RuleTimeline<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rules.serialize(serializer)
    }
}
