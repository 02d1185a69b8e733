// tests/unit_aggregate.rs
use meldric::aggregate::Engine;
use meldric::error::MeldError;
use meldric::filter::{FilterConfig, Filters};
use meldric::metric::MetricId;
use meldric::report::NodeKind;
use meldric::thresholds::ThresholdTable;
use meldric::types::{
    BreakdownEntry, ElementKind, Inconsistency, MemberKind, ParsedDocument, RawElement, RawMetric,
    SourceLocation, Status, SymbolLevel,
};
use std::collections::BTreeMap;

// --- Helpers ---

fn engine() -> Engine {
    Engine::new(
        Filters::compile(&FilterConfig::default()).unwrap(),
        ThresholdTable::builtin(),
    )
}

fn engine_with(config: &FilterConfig) -> Engine {
    Engine::new(Filters::compile(config).unwrap(), ThresholdTable::builtin())
}

fn doc(path: &str, elements: Vec<RawElement>) -> ParsedDocument {
    ParsedDocument {
        path: path.to_string(),
        solution_hint: Some("Acme".to_string()),
        elements,
        rule_descriptions: BTreeMap::new(),
    }
}

fn element(kind: ElementKind, fqn: &str) -> RawElement {
    let name = fqn.rsplit('.').next().unwrap_or(fqn).to_string();
    RawElement {
        kind,
        name,
        fqn: Some(fqn.to_string()),
        parent_fqn: None,
        assembly: Some("App".to_string()),
        member_kind: matches!(kind, ElementKind::Member).then_some(MemberKind::Method),
        location: None,
        metrics: BTreeMap::new(),
    }
}

fn with_metric(mut el: RawElement, id: MetricId, value: f64) -> RawElement {
    let _ = el.metrics.insert(
        id,
        RawMetric {
            value: Some(value),
            ..RawMetric::default()
        },
    );
    el
}

// --- Tests ---

#[test]
fn test_two_documents_merge_into_one_type_node() {
    let coverage = doc(
        "coverage.xml",
        vec![with_metric(
            element(ElementKind::Type, "A.B"),
            MetricId::LineCoverage,
            80.0,
        )],
    );
    let quality = doc(
        "metrics.xml",
        vec![with_metric(
            element(ElementKind::Type, "A.B"),
            MetricId::CyclomaticComplexity,
            12.0,
        )],
    );

    let outcome = engine().run(&[coverage, quality], None, &[]).unwrap();
    assert!(outcome.warnings.is_empty());

    let mut type_count = 0;
    outcome.report.solution.walk(&mut |n| {
        if n.level() == SymbolLevel::Type {
            type_count += 1;
        }
    });
    assert_eq!(type_count, 1);

    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    assert_eq!(ty.metric(MetricId::LineCoverage).unwrap().value, Some(80.0));
    assert_eq!(
        ty.metric(MetricId::CyclomaticComplexity).unwrap().value,
        Some(12.0)
    );
}

#[test]
fn test_merge_is_order_agnostic() {
    let coverage = doc(
        "coverage.xml",
        vec![
            with_metric(
                element(ElementKind::Member, "A.B.Run()"),
                MetricId::LineCoverage,
                80.0,
            ),
            with_metric(element(ElementKind::Type, "A.B"), MetricId::SourceLines, 40.0),
        ],
    );
    let quality = doc(
        "metrics.xml",
        vec![with_metric(
            element(ElementKind::Member, "A.B.Run()"),
            MetricId::CyclomaticComplexity,
            3.0,
        )],
    );

    let forward = engine()
        .run(&[coverage.clone(), quality.clone()], None, &[])
        .unwrap();
    let reverse = engine().run(&[quality, coverage], None, &[]).unwrap();

    assert_eq!(
        serde_json::to_value(&forward.report.solution).unwrap(),
        serde_json::to_value(&reverse.report.solution).unwrap()
    );
}

#[test]
fn test_rollup_sum_and_mean() {
    let members = doc(
        "coverage.xml",
        vec![
            with_metric(
                with_metric(
                    element(ElementKind::Member, "A.B.M1()"),
                    MetricId::SourceLines,
                    3.0,
                ),
                MetricId::LineCoverage,
                80.0,
            ),
            with_metric(
                with_metric(
                    element(ElementKind::Member, "A.B.M2()"),
                    MetricId::SourceLines,
                    5.0,
                ),
                MetricId::LineCoverage,
                60.0,
            ),
        ],
    );

    let outcome = engine().run(&[members], None, &[]).unwrap();
    let solution = &outcome.report.solution;

    let ty = solution.find(SymbolLevel::Type, "A.B").unwrap();
    assert_eq!(ty.metric(MetricId::SourceLines).unwrap().value, Some(8.0));
    assert_eq!(ty.metric(MetricId::LineCoverage).unwrap().value, Some(70.0));

    // Single-child chains propagate unchanged up to the solution.
    assert_eq!(
        solution.metric(MetricId::SourceLines).unwrap().value,
        Some(8.0)
    );
    assert_eq!(
        solution.metric(MetricId::LineCoverage).unwrap().value,
        Some(70.0)
    );
}

#[test]
fn test_directly_reported_parent_value_is_preserved() {
    let elements = doc(
        "metrics.xml",
        vec![
            with_metric(element(ElementKind::Type, "A.B"), MetricId::SourceLines, 100.0),
            with_metric(
                element(ElementKind::Member, "A.B.M1()"),
                MetricId::SourceLines,
                3.0,
            ),
        ],
    );
    let outcome = engine().run(&[elements], None, &[]).unwrap();
    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    assert_eq!(ty.metric(MetricId::SourceLines).unwrap().value, Some(100.0));
}

#[test]
fn test_cross_source_conflict_first_wins() {
    let first = doc(
        "coverage.xml",
        vec![with_metric(
            element(ElementKind::Type, "A.B"),
            MetricId::LineCoverage,
            80.0,
        )],
    );
    let second = doc(
        "other-coverage.xml",
        vec![with_metric(
            element(ElementKind::Type, "A.B"),
            MetricId::LineCoverage,
            75.0,
        )],
    );

    let outcome = engine().run(&[first, second], None, &[]).unwrap();
    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    assert_eq!(ty.metric(MetricId::LineCoverage).unwrap().value, Some(80.0));
    assert_eq!(
        outcome.warnings,
        vec![Inconsistency::MetricConflict {
            fqn: "A.B".to_string(),
            metric: "LineCoverage".to_string(),
            kept: 80.0,
            ignored: 75.0,
        }]
    );
}

#[test]
fn test_conflicting_duplicate_in_one_source_is_fatal() {
    let mut a = element(ElementKind::Type, "A.B");
    a.location = Some(SourceLocation {
        file: "b.cs".to_string(),
        start_line: Some(1),
        end_line: None,
    });
    let mut b = a.clone();
    b.location = Some(SourceLocation {
        file: "other.cs".to_string(),
        start_line: Some(9),
        end_line: None,
    });

    let err = engine()
        .run(&[doc("metrics.xml", vec![a, b])], None, &[])
        .unwrap_err();
    assert!(matches!(err, MeldError::ConflictingElement { .. }));
}

#[test]
fn test_identical_duplicate_is_tolerated() {
    let a = with_metric(element(ElementKind::Type, "A.B"), MetricId::LineCoverage, 80.0);
    let b = a.clone();
    let outcome = engine()
        .run(&[doc("coverage.xml", vec![a, b])], None, &[])
        .unwrap();
    assert!(outcome.warnings.is_empty());
    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    assert_eq!(ty.metric(MetricId::LineCoverage).unwrap().value, Some(80.0));
}

#[test]
fn test_excluded_element_contributes_zero_rollup_weight() {
    let elements = vec![
        with_metric(
            element(ElementKind::Member, "A.B.Good()"),
            MetricId::SourceLines,
            3.0,
        ),
        with_metric(
            element(ElementKind::Member, "A.B.Bad()"),
            MetricId::SourceLines,
            100.0,
        ),
    ];

    let unfiltered = engine()
        .run(&[doc("metrics.xml", elements.clone())], None, &[])
        .unwrap();
    let filtered = engine_with(&FilterConfig {
        member_patterns: "Bad".to_string(),
        ..FilterConfig::default()
    })
    .run(&[doc("metrics.xml", elements)], None, &[])
    .unwrap();

    let value = |outcome: &meldric::report::AggregationOutcome| {
        outcome
            .report
            .solution
            .find(SymbolLevel::Type, "A.B")
            .unwrap()
            .metric(MetricId::SourceLines)
            .unwrap()
            .value
    };
    assert_eq!(value(&unfiltered), Some(103.0));
    assert_eq!(value(&filtered), Some(3.0));
}

#[test]
fn test_excluded_type_is_not_resurrected_by_orphan_member() {
    // A member arriving without a parent FQN must not recreate a node for
    // its filtered-out enclosing type.
    let elements = vec![with_metric(
        element(ElementKind::Member, "App.Generated.Widget.Run()"),
        MetricId::SourceLines,
        50.0,
    )];
    let outcome = engine_with(&FilterConfig {
        type_patterns: "App.Generated".to_string(),
        ..FilterConfig::default()
    })
    .run(&[doc("metrics.xml", elements)], None, &[])
    .unwrap();

    let solution = &outcome.report.solution;
    assert!(solution
        .find(SymbolLevel::Type, "App.Generated.Widget")
        .is_none());
    assert!(solution
        .find(SymbolLevel::Member, "App.Generated.Widget.Run(...)")
        .is_none());
    assert!(solution.metric(MetricId::SourceLines).is_none());
}

#[test]
fn test_state_machine_coverage_absorption() {
    let coverage = doc(
        "coverage.xml",
        vec![with_metric(
            element(ElementKind::Member, "App.Fetcher.<Fetch>d__3.MoveNext()"),
            MetricId::LineCoverage,
            55.0,
        )],
    );

    let outcome = engine().run(&[coverage], None, &[]).unwrap();
    let solution = &outcome.report.solution;

    let member = solution
        .find(SymbolLevel::Member, "App.Fetcher.Fetch(...)")
        .unwrap();
    assert_eq!(member.metric(MetricId::LineCoverage).unwrap().value, Some(55.0));
    assert_eq!(
        member.kind,
        NodeKind::Member {
            member_kind: MemberKind::Method,
            state_machine_coverage: true,
        }
    );
    assert!(solution.find(SymbolLevel::Type, "App.Fetcher").is_some());
    assert!(solution
        .find(SymbolLevel::Type, "App.Fetcher.<Fetch>d__3")
        .is_none());
}

#[test]
fn test_statuses_evaluated_per_level() {
    let coverage = doc(
        "coverage.xml",
        vec![with_metric(
            element(ElementKind::Member, "A.B.Run()"),
            MetricId::LineCoverage,
            55.0,
        )],
    );
    let outcome = engine().run(&[coverage], None, &[]).unwrap();
    let member = outcome
        .report
        .solution
        .find(SymbolLevel::Member, "A.B.Run(...)")
        .unwrap();
    assert_eq!(member.metric(MetricId::LineCoverage).unwrap().status, Status::Error);
    // Rolled-up ancestors are evaluated too.
    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    assert_eq!(ty.metric(MetricId::LineCoverage).unwrap().status, Status::Error);
}

#[test]
fn test_diagnostics_breakdown_rolls_up() {
    let breakdown = |pairs: &[(&str, u64)]| {
        Some(
            pairs
                .iter()
                .map(|(rule, count)| {
                    (
                        (*rule).to_string(),
                        BreakdownEntry {
                            count: *count,
                            details: Vec::new(),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        )
    };

    let mut m1 = element(ElementKind::Member, "A.B.M1()");
    let _ = m1.metrics.insert(
        MetricId::Violations,
        RawMetric {
            value: Some(2.0),
            unit: None,
            breakdown: breakdown(&[("CA1001", 2)]),
        },
    );
    let mut m2 = element(ElementKind::Member, "A.B.M2()");
    let _ = m2.metrics.insert(
        MetricId::Violations,
        RawMetric {
            value: Some(2.0),
            unit: None,
            breakdown: breakdown(&[("CA1001", 1), ("CA2000", 1)]),
        },
    );

    let outcome = engine()
        .run(&[doc("sarif.json", vec![m1, m2])], None, &[])
        .unwrap();
    let ty = outcome
        .report
        .solution
        .find(SymbolLevel::Type, "A.B")
        .unwrap();
    let violations = ty.metric(MetricId::Violations).unwrap();
    assert_eq!(violations.value, Some(4.0));
    let rolled = violations.breakdown.as_ref().unwrap();
    assert_eq!(rolled.get("CA1001").unwrap().count, 3);
    assert_eq!(rolled.get("CA2000").unwrap().count, 1);
}

#[test]
fn test_solution_root_uses_hint() {
    let outcome = engine()
        .run(&[doc("coverage.xml", vec![])], None, &[])
        .unwrap();
    assert_eq!(outcome.report.solution.name, "Acme");
    assert_eq!(outcome.report.solution.level(), SymbolLevel::Solution);
    assert_eq!(outcome.report.metadata.solution_name, "Acme");
}
