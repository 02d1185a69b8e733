// src/aggregate/suppression.rs
//! Correlates externally declared suppressions onto the merged tree.
//!
//! The lookup is keyed by (FQN, metric) with last-write-wins on duplicate
//! keys; under concurrent-unordered input the entry that survives a
//! duplicate is therefore not deterministic, which is acceptable because
//! only the latest suppression for a pair is meaningful. The upstream
//! analyzer is best-effort, so incomplete entries are skipped, not fatal.

use super::arena::NodeArena;
use crate::metric::MetricId;
use crate::types::{Inconsistency, SuppressedSymbol, SuppressionRef};
use std::collections::HashMap;

pub fn correlate(
    arena: &mut NodeArena,
    suppressions: &[SuppressedSymbol],
    warnings: &mut Vec<Inconsistency>,
) {
    let mut index: HashMap<(String, MetricId), SuppressionRef> = HashMap::new();
    for entry in suppressions {
        let Some(fqn) = entry.fqn.as_deref().filter(|f| !f.trim().is_empty()) else {
            warnings.push(Inconsistency::SkippedSuppression {
                reason: "missing fully-qualified name".to_string(),
            });
            continue;
        };
        let Some(metric_name) = entry.metric.as_deref().filter(|m| !m.trim().is_empty()) else {
            warnings.push(Inconsistency::SkippedSuppression {
                reason: format!("missing metric for '{fqn}'"),
            });
            continue;
        };
        let Some(metric) = MetricId::parse(metric_name) else {
            warnings.push(Inconsistency::SkippedSuppression {
                reason: format!("unparsable metric '{metric_name}' for '{fqn}'"),
            });
            continue;
        };
        let _ = index.insert(
            (fqn.to_string(), metric),
            SuppressionRef {
                rule_id: entry.rule_id.clone().unwrap_or_default(),
                justification: entry.justification.clone().unwrap_or_default(),
            },
        );
    }
    if index.is_empty() {
        return;
    }

    for id in 0..arena.len() {
        let node = arena.node_mut(id);
        let fqn = node.fqn.clone();
        for (metric, cell) in &mut node.metrics {
            // Attaches rule id and justification only; the computed status
            // stays untouched.
            if let Some(suppression) = index.get(&(fqn.clone(), *metric)) {
                cell.suppression = Some(suppression.clone());
            }
        }
    }
}
