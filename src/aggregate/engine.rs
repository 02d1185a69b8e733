// src/aggregate/engine.rs
//! The aggregation orchestrator: one pass per run, fresh state throughout.
//!
//! Stages in order: collect + validate, normalize + filter, merge by
//! identity, rollup, threshold evaluation, baseline diff, suppression
//! correlation. A fatal condition aborts the run with no partial report.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MeldError, Result};
use crate::filter::Filters;
use crate::normalize::{normalize_signature, normalize_type_name};
use crate::report::{AggregationOutcome, MetricsReport, ReportMetadata};
use crate::thresholds::ThresholdTable;
use crate::types::{
    ElementKind, MemberKind, ParsedDocument, RawElement, SourceLocation, SuppressedSymbol,
};

use super::arena::NodeArena;
use super::{baseline, merge, rollup, suppression};

/// Solution name used when no document offers a hint.
const DEFAULT_SOLUTION_NAME: &str = "Solution";

/// Matches a member reported against a compiler-generated async/iterator
/// state-machine type: `Ns.Type.<Run>d__3.MoveNext(...)`.
static STATE_MACHINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<outer>.+)\.<(?P<method>[^>]+)>d__\d+\.MoveNext(?:\(.*)?$")
        .expect("valid state-machine regex")
});

/// The cross-tool aggregation engine. One instance per run configuration;
/// each `run` builds fresh state, so runs never share mutable data.
#[derive(Debug)]
pub struct Engine {
    filters: Filters,
    thresholds: ThresholdTable,
}

impl Engine {
    #[must_use]
    pub fn new(filters: Filters, thresholds: ThresholdTable) -> Self {
        Self {
            filters,
            thresholds,
        }
    }

    /// Runs the full aggregation over all parsed documents.
    ///
    /// # Errors
    /// Returns `MeldError::ConflictingElement` when one document reports the
    /// same symbol identity twice with different source locations.
    pub fn run(
        &self,
        documents: &[ParsedDocument],
        baseline_report: Option<&MetricsReport>,
        suppressions: &[SuppressedSymbol],
    ) -> Result<AggregationOutcome> {
        let mut warnings = Vec::new();
        validate_documents(documents)?;

        let solution_name = documents
            .iter()
            .find_map(|d| d.solution_hint.clone())
            .unwrap_or_else(|| DEFAULT_SOLUTION_NAME.to_string());

        let mut arena = NodeArena::new(&solution_name);
        for document in documents {
            for element in &document.elements {
                let (normalized, state_machine) = normalize_element(element);
                if self.filters.excludes(&normalized) {
                    continue;
                }
                merge::merge_element(&mut arena, &normalized, state_machine, &mut warnings);
            }
        }

        rollup::roll_up(&mut arena);
        evaluate_thresholds(&mut arena, &self.thresholds);
        if let Some(previous) = baseline_report {
            baseline::apply_baseline(&mut arena, previous);
        }
        suppression::correlate(&mut arena, suppressions, &mut warnings);

        let mut rule_descriptions = BTreeMap::new();
        for document in documents {
            rule_descriptions.extend(
                document
                    .rule_descriptions
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        let metadata = ReportMetadata {
            generated_at: chrono::Utc::now(),
            solution_name,
            document_paths: documents.iter().map(|d| d.path.clone()).collect(),
            thresholds: self.thresholds.clone(),
            suppressed_symbols: suppressions.to_vec(),
            rule_descriptions,
        };
        Ok(AggregationOutcome {
            report: MetricsReport {
                metadata,
                solution: arena.into_tree(),
            },
            warnings,
        })
    }
}

/// Rejects any document that reports one symbol identity twice with
/// conflicting source locations. Identical duplicates are tolerated; merge
/// dedupes them naturally.
fn validate_documents(documents: &[ParsedDocument]) -> Result<()> {
    for document in documents {
        let mut seen: HashMap<(ElementKind, &str), &Option<SourceLocation>> = HashMap::new();
        for element in &document.elements {
            let key = (element.kind, element.identity());
            match seen.get(&key) {
                Some(previous) if **previous != element.location => {
                    return Err(MeldError::ConflictingElement {
                        document: document.path.clone(),
                        fqn: element.identity().to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    let _ = seen.insert(key, &element.location);
                }
            }
        }
    }
    Ok(())
}

/// Canonicalizes an element's identity and detects state-machine members.
///
/// A member reported against a compiler-generated state-machine type is
/// remapped onto the real method of the enclosing type, so its coverage is
/// absorbed where a reader expects it.
fn normalize_element(element: &RawElement) -> (RawElement, bool) {
    let mut el = element.clone();
    match el.kind {
        ElementKind::Assembly | ElementKind::Namespace => {}
        ElementKind::Type => {
            el.name = normalize_type_name(&el.name);
            el.fqn = el.fqn.as_deref().map(normalize_type_name);
        }
        ElementKind::Member => {
            if let Some((fqn, method, outer)) = absorb_state_machine(el.identity()) {
                el.fqn = Some(fqn);
                el.name = method;
                el.parent_fqn = Some(outer);
                el.member_kind = Some(MemberKind::Method);
                return (el, true);
            }
            el.name = normalize_signature(&el.name);
            el.fqn = el.fqn.as_deref().map(normalize_signature);
            el.parent_fqn = el.parent_fqn.as_deref().map(normalize_type_name);
        }
    }
    (el, false)
}

/// Rewrites `Ns.Type.<Run>d__3.MoveNext(...)` to `Ns.Type.Run(...)`.
/// Returns (member FQN, method name, enclosing type FQN) when it applies.
fn absorb_state_machine(member_fqn: &str) -> Option<(String, String, String)> {
    let caps = STATE_MACHINE_RE.captures(member_fqn)?;
    let outer = normalize_type_name(&caps["outer"]);
    let method = caps["method"].to_string();
    let fqn = normalize_signature(&format!("{outer}.{method}()"));
    Some((fqn, method, outer))
}

fn evaluate_thresholds(arena: &mut NodeArena, table: &ThresholdTable) {
    for id in 0..arena.len() {
        let node = arena.node_mut(id);
        let level = node.level;
        for (metric, cell) in &mut node.metrics {
            cell.status = table.evaluate(*metric, level, cell.value);
        }
    }
}
