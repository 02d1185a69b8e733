// src/aggregate/merge.rs
//! Identity-keyed merge of surviving elements into the arena.
//!
//! Every element resolves its full ancestor chain (assembly -> namespace ->
//! type -> member) before contributing, so the same chain from two documents
//! lands on the same nodes. Metric union is commutative except for genuine
//! cross-source value conflicts, which the named first-source-wins policy
//! resolves and reports.

use super::arena::{NodeArena, NodeId};
use crate::metric::MetricId;
use crate::normalize::parent_identity;
use crate::types::{ElementKind, Inconsistency, MetricValue, RawElement, RawMetric, SymbolLevel};

/// Fallback assembly for sources that do not say which module a symbol came
/// from.
const UNKNOWN_ASSEMBLY: &str = "<unknown>";

/// Display name for the empty (global) namespace.
const GLOBAL_NAMESPACE: &str = "<global>";

/// Merges one normalized, filter-surviving element into the arena.
pub fn merge_element(
    arena: &mut NodeArena,
    el: &RawElement,
    state_machine: bool,
    warnings: &mut Vec<Inconsistency>,
) {
    let target = match el.kind {
        ElementKind::Assembly => resolve_assembly(arena, el.identity()),
        ElementKind::Namespace => {
            let assembly = resolve_assembly(arena, assembly_name(el));
            resolve_namespace(arena, assembly, el.identity())
        }
        ElementKind::Type => {
            let assembly = resolve_assembly(arena, assembly_name(el));
            resolve_type(arena, assembly, el.identity(), el.parent_fqn.as_deref())
        }
        ElementKind::Member => {
            let assembly = resolve_assembly(arena, assembly_name(el));
            let member_fqn = el.identity();
            let type_fqn = el
                .parent_fqn
                .clone()
                .unwrap_or_else(|| parent_identity(member_fqn));
            let type_id = resolve_type(arena, assembly, &type_fqn, None);
            arena.resolve(type_id, SymbolLevel::Member, &el.name, member_fqn)
        }
    };
    let node = arena.node_mut(target);
    if node.location.is_none() {
        node.location.clone_from(&el.location);
    }
    if node.member_kind.is_none() {
        node.member_kind = el.member_kind;
    }
    node.state_machine_coverage |= state_machine;
    let fqn = node.fqn.clone();
    for (id, raw) in &el.metrics {
        if let Some(existing) = node.metrics.get_mut(id) {
            resolve_metric_conflict(existing, raw, &fqn, *id, warnings);
        } else {
            let _ = node.metrics.insert(*id, MetricValue::from_raw(raw));
        }
    }
}

/// The explicit conflict policy: the first source's value wins; a later
/// source only fills gaps. A genuine value conflict is reported, never
/// silently resolved the other way.
pub fn resolve_metric_conflict(
    existing: &mut MetricValue,
    incoming: &RawMetric,
    fqn: &str,
    id: MetricId,
    warnings: &mut Vec<Inconsistency>,
) {
    match (existing.value, incoming.value) {
        (None, Some(v)) => existing.value = Some(v),
        (Some(kept), Some(ignored)) if (kept - ignored).abs() > f64::EPSILON => {
            warnings.push(Inconsistency::MetricConflict {
                fqn: fqn.to_string(),
                metric: id.to_string(),
                kept,
                ignored,
            });
        }
        _ => {}
    }
    if existing.unit.is_none() {
        existing.unit.clone_from(&incoming.unit);
    }
    if existing.breakdown.is_none() {
        existing.breakdown.clone_from(&incoming.breakdown);
    }
}

fn assembly_name(el: &RawElement) -> &str {
    el.assembly.as_deref().unwrap_or(UNKNOWN_ASSEMBLY)
}

fn resolve_assembly(arena: &mut NodeArena, name: &str) -> NodeId {
    let root = arena.root();
    arena.resolve(root, SymbolLevel::Assembly, name, name)
}

fn resolve_namespace(arena: &mut NodeArena, assembly: NodeId, fqn: &str) -> NodeId {
    let display = if fqn.is_empty() { GLOBAL_NAMESPACE } else { fqn };
    arena.resolve(assembly, SymbolLevel::Namespace, display, fqn)
}

fn resolve_type(
    arena: &mut NodeArena,
    assembly: NodeId,
    type_fqn: &str,
    parent_fqn: Option<&str>,
) -> NodeId {
    let namespace_fqn = parent_fqn
        .map(str::to_string)
        .unwrap_or_else(|| parent_identity(type_fqn));
    let namespace = resolve_namespace(arena, assembly, &namespace_fqn);
    let name = type_fqn.rsplit('.').next().unwrap_or(type_fqn);
    arena.resolve(namespace, SymbolLevel::Type, name, type_fqn)
}
