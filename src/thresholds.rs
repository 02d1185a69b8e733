//! Threshold resolution and status evaluation.
//!
//! Resolution is a pure function (builtin defaults, override JSON) -> frozen
//! table. Definitions are cloned before modification, never mutated in a
//! shared default, and after resolution every metric in the table carries an
//! entry for every symbol level (no gaps).

use crate::error::{MeldError, Result};
use crate::metric::MetricId;
use crate::types::{Inconsistency, Status, SymbolLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Warning/error limits plus polarity for one (metric, level) slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThreshold {
    pub warning: Option<f64>,
    pub error: Option<f64>,
    pub higher_is_better: bool,
    /// When set, a positive delta renders as neither improving nor degrading
    /// (growth-expected metrics such as line counts).
    pub positive_delta_neutral: bool,
}

impl MetricThreshold {
    #[must_use]
    pub fn new(warning: Option<f64>, error: Option<f64>, higher_is_better: bool) -> Self {
        Self {
            warning,
            error,
            higher_is_better,
            positive_delta_neutral: false,
        }
    }

    /// Evaluates a raw value into a status. A missing value is NA; otherwise
    /// error is checked before warning, with polarity flipping the
    /// comparison. Boundary values sit on the healthy side: a value exactly
    /// at the warning limit is Success, exactly at the error limit Warning.
    #[must_use]
    pub fn evaluate(&self, value: Option<f64>) -> Status {
        let Some(v) = value else {
            return Status::Na;
        };
        let breaches = |limit: f64| {
            if self.higher_is_better {
                v < limit
            } else {
                v > limit
            }
        };
        if self.error.is_some_and(breaches) {
            return Status::Error;
        }
        if self.warning.is_some_and(breaches) {
            return Status::Warning;
        }
        Status::Success
    }

    /// Classifies a baseline delta for presentation.
    #[must_use]
    pub fn delta_rating(&self, delta: Option<f64>) -> Option<DeltaRating> {
        let d = delta?;
        if d == 0.0 || (d > 0.0 && self.positive_delta_neutral) {
            return Some(DeltaRating::Neutral);
        }
        let improved = if self.higher_is_better { d > 0.0 } else { d < 0.0 };
        Some(if improved {
            DeltaRating::Improved
        } else {
            DeltaRating::Degraded
        })
    }
}

/// Direction of a baseline delta, polarity-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaRating {
    Improved,
    Degraded,
    Neutral,
}

/// One metric's description plus its per-level thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdDefinition {
    pub description: String,
    pub levels: BTreeMap<SymbolLevel, MetricThreshold>,
}

impl ThresholdDefinition {
    /// The same threshold at every symbol level.
    fn uniform(description: &str, threshold: MetricThreshold) -> Self {
        Self {
            description: description.to_string(),
            levels: SymbolLevel::ALL
                .iter()
                .map(|l| (*l, threshold))
                .collect(),
        }
    }

    /// A definition with no per-level entries yet; overrides populate the
    /// explicitly-configured levels and gap filling covers the rest.
    fn empty(description: &str) -> Self {
        Self {
            description: description.to_string(),
            levels: BTreeMap::new(),
        }
    }

    /// Polarity flags this definition already encodes; any level works, they
    /// are kept uniform across levels.
    fn polarity(&self, default_hib: bool) -> (bool, bool) {
        self.levels
            .values()
            .next()
            .map_or((default_hib, false), |t| (t.higher_is_better, t.positive_delta_neutral))
    }
}

/// The resolved per-metric, per-level threshold table. Read-only during
/// aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTable {
    definitions: BTreeMap<MetricId, ThresholdDefinition>,
}

impl ThresholdTable {
    /// The fixed default table covering every builtin metric identifier.
    #[must_use]
    pub fn builtin() -> Self {
        let pct = MetricThreshold::new(Some(75.0), Some(60.0), true);
        let lines = MetricThreshold {
            warning: None,
            error: None,
            higher_is_better: false,
            positive_delta_neutral: true,
        };
        let mut definitions = BTreeMap::new();
        let mut put = |id: MetricId, desc: &str, t: MetricThreshold| {
            let _ = definitions.insert(id, ThresholdDefinition::uniform(desc, t));
        };
        put(MetricId::LineCoverage, "Line coverage percentage", pct);
        put(MetricId::BranchCoverage, "Branch coverage percentage", pct);
        put(MetricId::MethodCoverage, "Method coverage percentage", pct);
        put(
            MetricId::CyclomaticComplexity,
            "Cyclomatic complexity",
            MetricThreshold::new(Some(15.0), Some(30.0), false),
        );
        put(
            MetricId::MaintainabilityIndex,
            "Maintainability index",
            MetricThreshold::new(Some(40.0), Some(20.0), true),
        );
        put(
            MetricId::ClassCoupling,
            "Class coupling",
            MetricThreshold::new(Some(30.0), Some(50.0), false),
        );
        put(
            MetricId::DepthOfInheritance,
            "Depth of inheritance",
            MetricThreshold::new(Some(4.0), Some(6.0), false),
        );
        put(MetricId::SourceLines, "Source lines", lines);
        put(MetricId::ExecutableLines, "Executable lines", lines);
        put(
            MetricId::Violations,
            "Static-analysis violations",
            MetricThreshold::new(Some(1.0), Some(10.0), false),
        );
        Self { definitions }
    }

    /// Resolves the builtin defaults against an optional override payload.
    ///
    /// Unknown level names and non-object level entries inside an override
    /// are ignored; unknown non-numeric metric names are skipped with a
    /// recorded warning; numeric names synthesize a custom metric.
    ///
    /// # Errors
    /// Returns `MeldError::ThresholdJson` when the payload is unparsable —
    /// that is a fatal configuration error, never recovered silently.
    pub fn resolve(overrides: Option<&str>) -> Result<(Self, Vec<Inconsistency>)> {
        let mut table = Self::builtin();
        let mut warnings = Vec::new();
        let Some(json) = overrides else {
            return Ok((table, warnings));
        };
        let payload: OverridePayload =
            serde_json::from_str(json).map_err(|e| MeldError::ThresholdJson(e.to_string()))?;
        for entry in payload.metrics {
            table.apply_override(&entry, &mut warnings);
        }
        table.fill_gaps();
        Ok((table, warnings))
    }

    fn apply_override(&mut self, entry: &MetricOverride, warnings: &mut Vec<Inconsistency>) {
        let Some(id) = MetricId::parse(&entry.name) else {
            warnings.push(Inconsistency::UnknownOverrideMetric {
                name: entry.name.clone(),
            });
            return;
        };
        // Clone-then-replace: shared defaults are never mutated in place.
        let mut def = self
            .definitions
            .get(&id)
            .cloned()
            .unwrap_or_else(|| ThresholdDefinition::empty(&entry.name));
        if let Some(desc) = &entry.description {
            def.description.clone_from(desc);
        }
        let (existing_hib, existing_pdn) = def.polarity(id.higher_is_better());
        let hib = entry.higher_is_better.unwrap_or(existing_hib);
        let pdn = entry.positive_delta_neutral.unwrap_or(existing_pdn);
        for threshold in def.levels.values_mut() {
            threshold.higher_is_better = hib;
            threshold.positive_delta_neutral = pdn;
        }
        for (level_name, value) in &entry.symbol_thresholds {
            let Some(level) = SymbolLevel::parse(level_name) else {
                continue; // unknown level names are ignored, not rejected
            };
            let mut threshold = MetricThreshold::new(None, None, hib);
            threshold.positive_delta_neutral = pdn;
            if let Some(limits) = value.as_object() {
                threshold.warning = limits.get("warning").and_then(serde_json::Value::as_f64);
                threshold.error = limits.get("error").and_then(serde_json::Value::as_f64);
            }
            let _ = def.levels.insert(level, threshold);
        }
        let _ = self.definitions.insert(id, def);
    }

    /// Ensures every metric has an entry for every symbol level, copying the
    /// warning/error of whatever was explicitly set (nulls when nothing was).
    fn fill_gaps(&mut self) {
        for (id, def) in &mut self.definitions {
            let template = def
                .levels
                .values()
                .copied()
                .next()
                .unwrap_or(MetricThreshold::new(None, None, id.higher_is_better()));
            for level in SymbolLevel::ALL {
                let _ = def.levels.entry(*level).or_insert(template);
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: MetricId) -> Option<&ThresholdDefinition> {
        self.definitions.get(&id)
    }

    #[must_use]
    pub fn threshold(&self, id: MetricId, level: SymbolLevel) -> Option<&MetricThreshold> {
        self.definitions.get(&id).and_then(|d| d.levels.get(&level))
    }

    /// Evaluates a value for a (metric, level) slot. Metrics without a table
    /// entry fall back to polarity-only evaluation (no limits, so any present
    /// value is Success).
    #[must_use]
    pub fn evaluate(&self, id: MetricId, level: SymbolLevel, value: Option<f64>) -> Status {
        match self.threshold(id, level) {
            Some(t) => t.evaluate(value),
            None => MetricThreshold::new(None, None, id.higher_is_better()).evaluate(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricId, &ThresholdDefinition)> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// Override payload shape: { "metrics": [ { "name", "description"?,
// "higherIsBetter"?, "positiveDeltaNeutral"?, "symbolThresholds": {...} } ] }
#[derive(Debug, Deserialize)]
struct OverridePayload {
    #[serde(default)]
    metrics: Vec<MetricOverride>,
}

#[derive(Debug, Deserialize)]
struct MetricOverride {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "higherIsBetter")]
    higher_is_better: Option<bool>,
    #[serde(default, rename = "positiveDeltaNeutral")]
    positive_delta_neutral: Option<bool>,
    #[serde(default, rename = "symbolThresholds")]
    symbol_thresholds: serde_json::Map<String, serde_json::Value>,
}
