#[test]
fn cmb_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/cmb_error_pass.rs");
}
