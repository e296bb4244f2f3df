//! Report fixtures for integration tests.
#![allow(dead_code)]

use depgraph_view::config::Layout;
use depgraph_view::domain::semantic::{DependencyTarget, JsonElement, NodeKind, ReportInput};
use depgraph_view::domain::vector::Circle;

/// Builds one element of a hierarchical report.
pub struct ElementBuilder {
    element: JsonElement,
}

fn element(full_name: &str, kind: NodeKind) -> ElementBuilder {
    let name = full_name
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(full_name)
        .to_string();
    ElementBuilder {
        element: JsonElement {
            name,
            full_name: full_name.to_string(),
            kind,
            children: vec![],
            superclass: None,
            interfaces: vec![],
            anonymous_implementation: vec![],
            method_calls: vec![],
            field_accesses: vec![],
            constructor_calls: vec![],
        },
    }
}

pub fn package(full_name: &str) -> ElementBuilder {
    element(full_name, NodeKind::Package)
}

pub fn clazz(full_name: &str) -> ElementBuilder {
    element(full_name, NodeKind::Class)
}

pub fn interface(full_name: &str) -> ElementBuilder {
    element(full_name, NodeKind::Interface)
}

fn access(target: &str, start_code_unit: &str, target_element: &str) -> DependencyTarget {
    DependencyTarget::Access {
        target: target.to_string(),
        start_code_unit: Some(start_code_unit.to_string()),
        target_code_element: Some(target_element.to_string()),
    }
}

impl ElementBuilder {
    pub fn calling_method(mut self, target: &str, start: &str, target_element: &str) -> Self {
        self.element
            .method_calls
            .push(access(target, start, target_element));
        self
    }

    pub fn accessing_field(mut self, target: &str, start: &str, target_element: &str) -> Self {
        self.element
            .field_accesses
            .push(access(target, start, target_element));
        self
    }

    pub fn calling_constructor(mut self, target: &str, start: &str, target_element: &str) -> Self {
        self.element
            .constructor_calls
            .push(access(target, start, target_element));
        self
    }

    pub fn extending(mut self, target: &str) -> Self {
        self.element.superclass = Some(target.to_string());
        self
    }

    pub fn implementing(mut self, target: &str) -> Self {
        self.element
            .interfaces
            .push(DependencyTarget::Name(target.to_string()));
        self
    }

    pub fn implementing_anonymous(mut self, target: &str) -> Self {
        self.element
            .anonymous_implementation
            .push(DependencyTarget::Name(target.to_string()));
        self
    }

    pub fn add(mut self, child: ElementBuilder) -> Self {
        self.element.children.push(child.build());
        self
    }

    pub fn build(self) -> JsonElement {
        self.element
    }

    pub fn report(self) -> ReportInput {
        ReportInput::Hierarchical(self.build())
    }
}

pub const PKG1_CLASS1: &str = "com.tngtech.pkg1.SomeClass1";
pub const PKG1_CLASS2: &str = "com.tngtech.pkg1.SomeClass2";
pub const INTERFACE1: &str = "com.tngtech.pkg2.SomeInterface1";
pub const SUBPKG_CLASS1: &str = "com.tngtech.pkg2.subpkg1.SomeClass1";
pub const OUTER_WITH_INTERFACE: &str = "com.tngtech.pkg2.subpkg1.SomeClassWithInnerInterface";
pub const INNER_INTERFACE: &str =
    "com.tngtech.pkg2.subpkg1.SomeClassWithInnerInterface$SomeInnerInterface";
pub const OUTER_WITH_CLASS: &str = "com.tngtech.SomeClassWithInnerClass";
pub const INNER_CLASS: &str = "com.tngtech.SomeClassWithInnerClass$SomeInnerClass";

/// Packages, classes, interfaces and inner classes with every kind of dependency.
pub fn test_report() -> ReportInput {
    package("com.tngtech")
        .add(
            package("com.tngtech.pkg1")
                .add(
                    clazz(PKG1_CLASS1)
                        .calling_method(PKG1_CLASS2, "startMethod(arg1, arg2)", "targetMethod()")
                        .accessing_field(PKG1_CLASS2, "startMethod(arg1, arg2)", "targetField")
                        .implementing(INTERFACE1),
                )
                .add(clazz(PKG1_CLASS2).accessing_field(PKG1_CLASS1, "startMethod(arg)", "targetField")),
        )
        .add(
            package("com.tngtech.pkg2")
                .add(interface(INTERFACE1))
                .add(
                    package("com.tngtech.pkg2.subpkg1")
                        .add(
                            clazz(SUBPKG_CLASS1)
                                .extending(PKG1_CLASS1)
                                .calling_constructor(PKG1_CLASS1, "<init>()", "<init>()"),
                        )
                        .add(
                            clazz(OUTER_WITH_INTERFACE)
                                .implementing_anonymous(INNER_INTERFACE)
                                .add(interface(INNER_INTERFACE).calling_method(
                                    OUTER_WITH_INTERFACE,
                                    "startMethod(arg)",
                                    "targetMethod(arg1, arg2)",
                                )),
                        ),
                ),
        )
        .add(
            clazz(OUTER_WITH_CLASS)
                .implementing_anonymous(INTERFACE1)
                .add(
                    clazz(INNER_CLASS)
                        .accessing_field(OUTER_WITH_CLASS, "startMethod1()", "targetField")
                        .accessing_field(OUTER_WITH_CLASS, "startMethod2()", "targetField"),
                ),
        )
        .report()
}

/// `SomeClass1` calls and accesses `SomeClass2`, which accesses `SomeClass1` back.
pub fn two_class_report() -> ReportInput {
    package("com.tngtech")
        .add(
            clazz("com.tngtech.SomeClass1")
                .calling_method("com.tngtech.SomeClass2", "startMethod()", "targetMethod()")
                .accessing_field("com.tngtech.SomeClass2", "startMethod()", "targetField"),
        )
        .add(clazz("com.tngtech.SomeClass2").accessing_field(
            "com.tngtech.SomeClass1",
            "startMethod()",
            "targetField",
        ))
        .report()
}

/// Side by side layout of [`two_class_report`].
pub fn two_class_layout() -> Layout {
    Layout::from([
        ("com.tngtech".to_string(), Circle::new(50.0, 0.0, 100.0)),
        ("com.tngtech.SomeClass1".to_string(), Circle::new(0.0, 0.0, 10.0)),
        ("com.tngtech.SomeClass2".to_string(), Circle::new(100.0, 0.0, 20.0)),
    ])
}

pub const TEST_REPORT_JSON: &str = r#"{
    "fullName": "com.tngtech",
    "name": "com.tngtech",
    "type": "package",
    "children": [
        {
            "fullName": "com.tngtech.pkg1",
            "name": "pkg1",
            "type": "package",
            "children": [
                {
                    "fullName": "com.tngtech.pkg1.SomeClass1",
                    "name": "SomeClass1",
                    "type": "class",
                    "methodCalls": [{"target": "com.tngtech.pkg1.SomeClass2", "startCodeUnit": "startMethod()", "targetCodeElement": "targetMethod()"}]
                },
                {"fullName": "com.tngtech.pkg1.SomeClass2", "name": "SomeClass2", "type": "class"}
            ]
        },
        {
            "fullName": "com.tngtech.pkg2",
            "name": "pkg2",
            "type": "package",
            "children": [
                {
                    "fullName": "com.tngtech.pkg2.SomeClass3",
                    "name": "SomeClass3",
                    "type": "class",
                    "superclass": "com.tngtech.pkg1.SomeClass1"
                }
            ]
        }
    ]
}"#;
