// src/aggregate/rollup.rs
//! Bottom-up metric rollup.
//!
//! Post-order over the arena: every metric present on any child and not
//! directly reported on the parent is aggregated upward per the metric's
//! rule (mean for percentage/complexity/index metrics, sum for counts).
//! A value a source tool reported against the parent itself is
//! authoritative and never overwritten by a recomputed child aggregate.

use super::arena::{NodeArena, NodeId};
use crate::metric::{MetricId, Rollup};
use crate::types::BreakdownEntry;
use std::collections::{BTreeMap, BTreeSet};

pub fn roll_up(arena: &mut NodeArena) {
    let root = arena.root();
    roll_node(arena, root);
}

fn roll_node(arena: &mut NodeArena, id: NodeId) {
    let children = arena.node(id).children.clone();
    for child in &children {
        roll_node(arena, *child);
    }
    if children.is_empty() {
        return;
    }

    let mut present: BTreeSet<MetricId> = BTreeSet::new();
    for child in &children {
        present.extend(arena.node(*child).metrics.keys().copied());
    }

    for metric in present {
        let directly_reported = arena
            .node(id)
            .metrics
            .get(&metric)
            .is_some_and(|m| m.value.is_some());
        if directly_reported {
            continue;
        }

        let mut values: Vec<f64> = Vec::new();
        let mut unit: Option<String> = None;
        let mut breakdown: Option<BTreeMap<String, BreakdownEntry>> = None;
        for child in &children {
            let Some(mv) = arena.node(*child).metrics.get(&metric) else {
                continue;
            };
            if let Some(v) = mv.value {
                values.push(v);
            }
            if unit.is_none() {
                unit.clone_from(&mv.unit);
            }
            if metric.is_diagnostic() {
                merge_breakdown(&mut breakdown, mv.breakdown.as_ref());
            }
        }
        if values.is_empty() && breakdown.is_none() {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let value = if values.is_empty() {
            None
        } else {
            let sum: f64 = values.iter().sum();
            Some(match metric.rollup() {
                Rollup::Sum => sum,
                Rollup::Mean => sum / values.len() as f64,
            })
        };

        let cell = arena.node_mut(id).metrics.entry(metric).or_default();
        cell.value = value;
        if cell.unit.is_none() {
            cell.unit = unit;
        }
        if cell.breakdown.is_none() {
            cell.breakdown = breakdown;
        }
    }
}

/// Accumulates child diagnostics breakdowns into the parent's: counts sum,
/// detail lists concatenate.
fn merge_breakdown(
    target: &mut Option<BTreeMap<String, BreakdownEntry>>,
    incoming: Option<&BTreeMap<String, BreakdownEntry>>,
) {
    let Some(incoming) = incoming else { return };
    let merged = target.get_or_insert_with(BTreeMap::new);
    for (rule, entry) in incoming {
        let slot = merged.entry(rule.clone()).or_default();
        slot.count += entry.count;
        slot.details.extend(entry.details.iter().cloned());
    }
}
