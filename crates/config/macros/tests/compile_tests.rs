//! Compile-time tests for stratum-config-macros.

#[test]
fn test_configurable_derive() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/configurable_pass.rs");
}

