mod common;

use common::fixtures::*;
use depgraph_view::app::engine::ReportSession;
use std::collections::{HashMap, HashSet};

fn visible_strings(session: &ReportSession) -> HashSet<String> {
    session
        .dependencies()
        .visible()
        .map(|d| d.to_string())
        .collect()
}

fn start_and_target_packages() -> ReportSession {
    let report = package("com.tngtech")
        .add(
            package("com.tngtech.startPkg").add(clazz("com.tngtech.startPkg.StartClass").calling_method(
                "com.tngtech.targetPkg.TargetClass",
                "startMethod()",
                "targetMethod()",
            )),
        )
        .add(package("com.tngtech.targetPkg").add(clazz("com.tngtech.targetPkg.TargetClass")))
        .report();
    ReportSession::from_report(&report)
}

#[test]
fn test_folding_both_packages_leaves_one_empty_dependency() {
    let mut session = start_and_target_packages();
    assert!(session.fold("com.tngtech.startPkg"));
    assert!(session.fold("com.tngtech.targetPkg"));

    let visible: Vec<String> = session
        .dependencies()
        .visible()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(visible, vec!["com.tngtech.startPkg->com.tngtech.targetPkg()"]);

    let dependency = session
        .dependencies()
        .find_visible("com.tngtech.startPkg", "com.tngtech.targetPkg")
        .unwrap();
    assert!(!dependency.has_detailed_description());
    assert_eq!(dependency.properties(), "dependency");
}

#[test]
fn test_unfolding_both_packages_restores_class_dependency() {
    let mut session = start_and_target_packages();
    let before = session
        .dependencies()
        .find_visible("com.tngtech.startPkg.StartClass", "com.tngtech.targetPkg.TargetClass")
        .unwrap()
        .id();

    session.fold("com.tngtech.startPkg");
    session.fold("com.tngtech.targetPkg");
    session.unfold("com.tngtech.startPkg");
    session.unfold("com.tngtech.targetPkg");

    let visible: Vec<String> = session
        .dependencies()
        .visible()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(
        visible,
        vec!["com.tngtech.startPkg.StartClass->com.tngtech.targetPkg.TargetClass(methodCall)"]
    );
    let after = session
        .dependencies()
        .find_visible("com.tngtech.startPkg.StartClass", "com.tngtech.targetPkg.TargetClass")
        .unwrap()
        .id();
    assert_eq!(before, after);
}

#[test]
fn test_fold_unfold_round_trip_keeps_visible_set_and_identities() {
    let mut session = ReportSession::from_report(&test_report());
    let before = visible_strings(&session);
    let ids_before: HashMap<String, _> = session
        .dependencies()
        .visible()
        .map(|d| (d.to_string(), d.id()))
        .collect();

    assert!(session.fold("com.tngtech.pkg1"));
    assert_eq!(
        visible_strings(&session),
        [
            format!("com.tngtech.pkg1->{}()", INTERFACE1),
            format!("{}->com.tngtech.pkg1()", SUBPKG_CLASS1),
            format!("{}->{}(methodCall)", INNER_INTERFACE, OUTER_WITH_INTERFACE),
            format!("{}->{}(implementsAnonymous)", OUTER_WITH_INTERFACE, INNER_INTERFACE),
            format!("{}->{}(implementsAnonymous)", OUTER_WITH_CLASS, INTERFACE1),
            format!("{}->{}(fieldAccess)", INNER_CLASS, OUTER_WITH_CLASS),
        ]
        .into_iter()
        .collect::<HashSet<_>>()
    );

    assert!(session.unfold("com.tngtech.pkg1"));
    assert_eq!(visible_strings(&session), before);
    for dependency in session.dependencies().visible() {
        assert_eq!(ids_before[&dependency.to_string()], dependency.id());
    }
}

#[test]
fn test_only_topmost_folded_node_is_applied() {
    let mut session = ReportSession::from_report(&test_report());
    assert!(session.fold("com.tngtech.pkg2.subpkg1"));
    assert!(session.fold("com.tngtech.pkg2"));

    let visible = visible_strings(&session);
    assert!(visible.contains(&"com.tngtech.pkg2->com.tngtech.pkg1.SomeClass1()".to_string()));
    assert!(
        !visible
            .iter()
            .any(|d| d.starts_with("com.tngtech.pkg2.subpkg1->"))
    );

    // the inner fold takes over again once the outer one is lifted
    assert!(session.unfold("com.tngtech.pkg2"));
    let visible = visible_strings(&session);
    assert!(visible.contains(&"com.tngtech.pkg2.subpkg1->com.tngtech.pkg1.SomeClass1()".to_string()));
}

#[test]
fn test_folding_class_drops_dependencies_on_its_inner_classes() {
    let mut session = ReportSession::from_report(&test_report());
    assert!(session.fold(OUTER_WITH_CLASS));
    let visible = visible_strings(&session);
    assert_eq!(visible.len(), 7);
    assert!(visible.contains(&format!("{}->{}(implementsAnonymous)", OUTER_WITH_CLASS, INTERFACE1)));
    assert!(!visible.iter().any(|d| d.starts_with(INNER_CLASS)));
}

#[test]
fn test_folded_class_takes_over_accesses_of_inner_class() {
    let report = package("com.tngtech")
        .add(
            clazz("com.tngtech.Outer")
                .accessing_field("com.tngtech.Outer$Inner", "init()", "field")
                .add(
                    clazz("com.tngtech.Outer$Inner")
                        .calling_method("com.tngtech.Outer", "run()", "back()")
                        .calling_method("com.tngtech.Other", "run()", "call()"),
                ),
        )
        .add(clazz("com.tngtech.Other"))
        .report();
    let mut session = ReportSession::from_report(&report);
    assert_eq!(session.dependencies().visible().count(), 3);

    assert!(session.fold("com.tngtech.Outer"));
    let visible: Vec<String> = session
        .dependencies()
        .visible()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(visible, vec!["com.tngtech.Outer->com.tngtech.Other(childrenAccess)"]);

    let dependency = session
        .dependencies()
        .find_visible("com.tngtech.Outer", "com.tngtech.Other")
        .unwrap();
    assert!(dependency.has_detailed_description());

    let details = session.details("com.tngtech.Outer", "com.tngtech.Other").details;
    let rendered: Vec<&str> = details.iter().map(|d| d.description.as_str()).collect();
    assert_eq!(rendered, vec!["Inner.run()->call()"]);
}

#[test]
fn test_folding_leaf_or_unknown_node_is_a_no_op() {
    let mut session = ReportSession::from_report(&test_report());
    let before = visible_strings(&session);
    assert!(!session.fold(PKG1_CLASS2));
    assert!(!session.fold("com.tngtech.missing"));
    assert!(!session.unfold("com.tngtech.pkg1"));
    assert_eq!(visible_strings(&session), before);
}

#[test]
fn test_folded_nodes_from_config_are_applied_at_once() {
    let mut session = ReportSession::from_report(&test_report());
    let config = depgraph_view::config::ViewConfig {
        folded: vec!["com.tngtech.pkg1".to_string(), "com.tngtech.pkg2".to_string()],
        ..Default::default()
    };
    session.apply_config(&config).unwrap();

    let visible = visible_strings(&session);
    assert!(visible.contains(&"com.tngtech.pkg2->com.tngtech.pkg1()".to_string()));
    assert!(visible.contains(&"com.tngtech.pkg1->com.tngtech.pkg2()".to_string()));
    assert!(session.dependencies().is_folded("com.tngtech.pkg1"));
    assert!(session.tree().is_folded("com.tngtech.pkg2"));
}
