mod common;

use common::fixtures::*;
use depgraph_view::app::engine::ReportSession;
use depgraph_view::domain::violations::{Violation, ViolationGroup};
use std::collections::HashSet;

fn group(rule: &str, violations: &[(&str, &str)]) -> ViolationGroup {
    ViolationGroup {
        rule: rule.to_string(),
        violations: violations
            .iter()
            .map(|(origin, target)| Violation {
                origin: origin.to_string(),
                target: target.to_string(),
            })
            .collect(),
    }
}

fn field_access_violation(rule: &str) -> ViolationGroup {
    group(
        rule,
        &[(
            "com.tngtech.SomeClass1.startMethod()",
            "com.tngtech.SomeClass2.targetField",
        )],
    )
}

fn is_violation(session: &ReportSession, from: &str, to: &str) -> bool {
    session
        .dependencies()
        .find_visible(from, to)
        .unwrap()
        .is_violation()
}

fn pkg1_and_subpkg_violations() -> ViolationGroup {
    group(
        "no access to pkg1",
        &[
            (
                "com.tngtech.pkg1.SomeClass1.startMethod(arg1, arg2)",
                "com.tngtech.pkg1.SomeClass2.targetMethod()",
            ),
            (
                "com.tngtech.pkg2.subpkg1.SomeClass1.<init>()",
                "com.tngtech.pkg1.SomeClass1.<init>()",
            ),
        ],
    )
}

#[test]
fn test_show_violations_marks_only_the_violating_direction() {
    let mut session = ReportSession::from_report(&two_class_report());
    session.show_violations(field_access_violation("rule1"));

    assert!(is_violation(&session, "com.tngtech.SomeClass1", "com.tngtech.SomeClass2"));
    assert!(!is_violation(&session, "com.tngtech.SomeClass2", "com.tngtech.SomeClass1"));

    let marked: Vec<String> = session
        .dependencies()
        .elementary()
        .iter()
        .filter(|d| d.is_violation)
        .map(|d| d.to_string())
        .collect();
    assert_eq!(
        marked,
        vec!["com.tngtech.SomeClass1->com.tngtech.SomeClass2(startMethod() fieldAccess targetField)"]
    );

    let dependency = session
        .dependencies()
        .find_visible("com.tngtech.SomeClass1", "com.tngtech.SomeClass2")
        .unwrap();
    assert_eq!(dependency.properties(), "dependency several violation");
}

#[test]
fn test_hiding_keeps_violations_of_other_shown_groups() {
    let mut session = ReportSession::from_report(&two_class_report());
    let rule1 = field_access_violation("rule1");
    let rule2 = field_access_violation("rule2");
    session.show_violations(rule1.clone());
    session.show_violations(rule2.clone());

    session.hide_violations(&rule1);
    assert!(is_violation(&session, "com.tngtech.SomeClass1", "com.tngtech.SomeClass2"));

    session.hide_violations(&rule2);
    assert!(!is_violation(&session, "com.tngtech.SomeClass1", "com.tngtech.SomeClass2"));
    assert!(session.dependencies().violations().is_empty());
}

#[test]
fn test_show_and_hide_are_idempotent() {
    let mut session = ReportSession::from_report(&two_class_report());
    let rule1 = field_access_violation("rule1");
    session.show_violations(rule1.clone());
    session.show_violations(rule1.clone());
    assert_eq!(session.violations().rules, vec!["rule1"]);

    session.hide_violations(&rule1);
    session.hide_violations(&rule1);
    assert!(session.violations().rules.is_empty());
    assert!(
        session
            .dependencies()
            .elementary()
            .iter()
            .all(|d| !d.is_violation)
    );
}

#[test]
fn test_nodes_containing_and_involved_in_violations() {
    let mut session = ReportSession::from_report(&test_report());
    session.show_violations(pkg1_and_subpkg_violations());

    let response = session.violations();
    assert_eq!(
        response.nodes_containing_violations,
        vec!["com.tngtech.pkg1", "com.tngtech"]
    );
    assert_eq!(
        response.nodes_involved_in_visible_violations,
        vec![PKG1_CLASS1, SUBPKG_CLASS1, PKG1_CLASS2]
    );
}

#[test]
fn test_isolated_violations_hide_everything_else() {
    let mut session = ReportSession::from_report(&test_report());
    session.set_isolate_violations(true);
    // without any shown group the precondition has no effect
    assert_eq!(session.dependencies().visible().count(), 8);

    session.show_violations(pkg1_and_subpkg_violations());
    let visible: HashSet<String> = session
        .dependencies()
        .visible()
        .map(|d| d.to_string())
        .collect();
    let expected: HashSet<String> = [
        format!("{}->{}(methodCall)", PKG1_CLASS1, PKG1_CLASS2),
        format!("{}->{}(constructorCall)", SUBPKG_CLASS1, PKG1_CLASS1),
    ]
    .into_iter()
    .collect();
    assert_eq!(visible, expected);
    assert!(session.dependencies().visible().all(|d| d.is_violation()));

    session.set_isolate_violations(false);
    assert_eq!(session.dependencies().visible().count(), 8);
}

#[test]
fn test_hide_nodes_without_violations() {
    let mut session = ReportSession::from_report(&test_report());
    session.set_hide_nodes_without_violations(true);
    assert_eq!(session.dependencies().visible().count(), 8);

    session.show_violations(pkg1_and_subpkg_violations());
    let visible: HashSet<String> = session
        .dependencies()
        .visible()
        .map(|d| format!("{}->{}", d.from(), d.to()))
        .collect();
    let expected: HashSet<String> = [
        format!("{}->{}", PKG1_CLASS1, PKG1_CLASS2),
        format!("{}->{}", PKG1_CLASS2, PKG1_CLASS1),
        format!("{}->{}", SUBPKG_CLASS1, PKG1_CLASS1),
    ]
    .into_iter()
    .collect();
    assert_eq!(visible, expected);
    assert!(session.tree().has_violations_filter());

    session.hide_violations(&pkg1_and_subpkg_violations());
    assert!(!session.tree().has_violations_filter());
    assert_eq!(session.dependencies().visible().count(), 8);
}

#[test]
fn test_violation_groups_shipped_with_flat_report() {
    let report: depgraph_view::domain::semantic::ReportInput = serde_json::from_str(
        r#"{
            "root": {"fullName": "com.tngtech", "type": "package", "children": [
                {"fullName": "com.tngtech.A", "type": "class"},
                {"fullName": "com.tngtech.B", "type": "class"}
            ]},
            "dependencies": [
                {"originClass": "com.tngtech.A", "targetClass": "com.tngtech.B", "type": "METHOD_CALL",
                 "startCodeUnit": "a()", "targetCodeElement": "b()"},
                {"originClass": "com.tngtech.B", "targetClass": "com.tngtech.A", "type": "INHERITANCE"}
            ],
            "violations": [{"rule": "no cycles", "violations": [{"origin": "com.tngtech.A.a()", "target": "com.tngtech.B.b()"}]}]
        }"#,
    )
    .unwrap();
    let mut session = ReportSession::from_report(&report);
    assert_eq!(session.available_violations().len(), 1);
    assert!(session.show_violations_of_rule("unknown rule").is_err());

    session.show_violations_of_rule("no cycles").unwrap();
    assert!(is_violation(&session, "com.tngtech.A", "com.tngtech.B"));
    assert!(!is_violation(&session, "com.tngtech.B", "com.tngtech.A"));
}
