//! Violation aggregation.
//!
//! Merges per-channel violation lists into one report with a fixed shape: every
//! validated channel is present (empty when clean), channels in `Channel::ALL`
//! order, fields in the order the engine reported them.

use crate::types::Channel;
use crate::validation::ValidationResult;
use indexmap::IndexMap;
use log::trace;
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub message: String,
    pub value: JsonValue,
}

/// channel → field path → violation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViolationReport(IndexMap<Channel, IndexMap<String, FieldReport>>);

impl ViolationReport {
    /// Builds the report from per-channel results given in any order.
    ///
    /// A field path reported twice in one channel keeps its first violation.
    pub fn from_results<'a>(
        results: impl IntoIterator<Item = (Channel, &'a ValidationResult)>,
    ) -> Self {
        let mut results: Vec<(Channel, &ValidationResult)> = results.into_iter().collect();
        results.sort_by_key(|(channel, _)| *channel);

        let mut report = IndexMap::with_capacity(results.len());
        for (channel, result) in results {
            let mut fields = IndexMap::with_capacity(result.violations.len());
            for violation in &result.violations {
                fields
                    .entry(violation.path.clone())
                    .or_insert_with(|| FieldReport {
                        message: violation.message.clone(),
                        value: violation.invalid_value.clone(),
                    });
            }
            trace!("{} channel: {} violation(s)", channel, fields.len());
            report.insert(channel, fields);
        }
        Self(report)
    }

    /// True when at least one channel reported a violation.
    pub fn any_violations(&self) -> bool {
        self.0.values().any(|fields| !fields.is_empty())
    }

    pub fn violation_count(&self) -> usize {
        self.0.values().map(IndexMap::len).sum()
    }

    pub fn channel(&self, channel: Channel) -> Option<&IndexMap<String, FieldReport>> {
        self.0.get(&channel)
    }

    /// Reported channels, in fixed order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.0.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Violation;
    use serde_json::json;

    fn result_with(violations: Vec<Violation>) -> ValidationResult {
        ValidationResult {
            violations,
            ..ValidationResult::default()
        }
    }

    #[test]
    fn test_clean_channels_reported_empty() {
        let clean = ValidationResult::default();
        let report = ViolationReport::from_results(
            Channel::ALL.into_iter().map(|channel| (channel, &clean)),
        );

        assert!(!report.any_violations());
        assert_eq!(report.channels().count(), 5);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"body": {}, "headers": {}, "query": {}, "path": {}, "cookies": {}})
        );
    }

    #[test]
    fn test_channel_order_fixed_regardless_of_input_order() {
        let clean = ValidationResult::default();
        let report = ViolationReport::from_results(vec![
            (Channel::Cookies, &clean),
            (Channel::Body, &clean),
            (Channel::Query, &clean),
        ]);

        let order: Vec<Channel> = report.channels().collect();
        assert_eq!(order, vec![Channel::Body, Channel::Query, Channel::Cookies]);
    }

    #[test]
    fn test_field_order_and_payload() {
        let body = result_with(vec![
            Violation::new("name", json!(null), "This field is missing."),
            Violation::new("age", json!(-1), "This value should be greater than or equal to 0."),
        ]);
        let clean = ValidationResult::default();
        let report = ViolationReport::from_results(vec![(Channel::Body, &body), (Channel::Query, &clean)]);

        assert!(report.any_violations());
        assert_eq!(report.violation_count(), 2);
        let fields: Vec<&String> = report.channel(Channel::Body).unwrap().keys().collect();
        assert_eq!(fields, vec!["name", "age"]);
        assert_eq!(
            serde_json::to_value(&report).unwrap()["body"]["age"],
            json!({"message": "This value should be greater than or equal to 0.", "value": -1})
        );
    }

    #[test]
    fn test_duplicate_path_keeps_first() {
        let body = result_with(vec![
            Violation::new("id", json!("x"), "first"),
            Violation::new("id", json!("x"), "second"),
        ]);
        let report = ViolationReport::from_results(vec![(Channel::Body, &body)]);
        assert_eq!(report.channel(Channel::Body).unwrap()["id"].message, "first");
    }
}
