// tests/unit_normalize.rs
use meldric::normalize::{normalize_method_name, normalize_signature, normalize_type_name};

#[test]
fn test_fully_qualified_parameters() {
    assert_eq!(
        normalize_signature("Run(System.String, System.Int32)"),
        "Run(...)"
    );
}

#[test]
fn test_short_nullable_parameters() {
    assert_eq!(normalize_signature("Run(string? path, int count)"), "Run(...)");
}

#[test]
fn test_both_conventions_converge() {
    let a = normalize_signature("Resolve(App.Core.Widget)");
    let b = normalize_signature("Resolve(Widget w)");
    assert_eq!(a, b);
    assert_eq!(a, "Resolve(...)");
}

#[test]
fn test_idempotence() {
    for raw in [
        "Run(System.String)",
        "Run(...)",
        "List`1",
        "<Run>b__0",
        "Map<T>(System.Func<T, T>)",
        "#ctor()",
        "Broken(int",
    ] {
        let once = normalize_signature(raw);
        assert_eq!(normalize_signature(&once), once, "not idempotent for {raw}");
    }
}

#[test]
fn test_nested_parens_in_parameter_types() {
    // Depth tracking: parens inside parameter types must not end the list.
    assert_eq!(
        normalize_signature("Apply(System.Func<(int, int)> pair)"),
        "Apply(...)"
    );
}

#[test]
fn test_return_type_suffix_dropped() {
    assert_eq!(normalize_signature("Run(string) : void"), "Run(...)");
}

#[test]
fn test_generic_method_name_stripped() {
    assert_eq!(normalize_signature("Map<T>(System.Func<T, T>)"), "Map(...)");
    assert_eq!(normalize_method_name("Map<T>"), "Map");
}

#[test]
fn test_arity_marker_stripped() {
    assert_eq!(normalize_type_name("List`1"), "List");
    assert_eq!(normalize_type_name("App.Inner`2.Leaf`1"), "App.Inner.Leaf");
}

#[test]
fn test_type_generic_arguments_truncated() {
    assert_eq!(
        normalize_type_name("Dictionary<string, List<int>>"),
        "Dictionary"
    );
    assert_eq!(normalize_type_name("App.Core.Cache<TKey, TValue>"), "App.Core.Cache");
}

#[test]
fn test_sentinel_name_preserved() {
    assert_eq!(normalize_type_name("<Module>"), "<Module>");
    assert_eq!(normalize_method_name("<Module>"), "<Module>");
}

#[test]
fn test_compiler_generated_names_preserved() {
    // Closing bracket followed by identifier text marks a generated name.
    assert_eq!(normalize_method_name("<Run>b__0"), "<Run>b__0");
    assert_eq!(normalize_type_name("App.Fetcher.<Fetch>d__3"), "App.Fetcher.<Fetch>d__3");
}

#[test]
fn test_constructor_marker_reprefixed() {
    assert_eq!(normalize_method_name("#ctor"), ".ctor");
    assert_eq!(normalize_method_name("#cctor"), ".cctor");
    assert_eq!(normalize_signature("#ctor(System.String)"), ".ctor(...)");
}

#[test]
fn test_blank_input_unchanged() {
    assert_eq!(normalize_signature(""), "");
    assert_eq!(normalize_signature("   "), "   ");
    assert_eq!(normalize_type_name(""), "");
}

#[test]
fn test_mismatched_parens_fall_back() {
    assert_eq!(normalize_signature("Broken(int"), "Broken(int");
}

#[test]
fn test_name_without_parameter_list() {
    assert_eq!(normalize_signature("get_Count"), "get_Count");
}
