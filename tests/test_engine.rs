//! Engine tests — directive lifecycle, expression evaluation, and the
//! error surface callers see.

use oplaw::engine::RuleEngine;
use oplaw::errors::OplawError;
use oplaw::law::Value;

// =========================================================================
// Helpers
// =========================================================================

fn engine(dsl: &str) -> RuleEngine {
    let mut engine = RuleEngine::new();
    engine.load_rules(dsl).unwrap_or_else(|e| panic!("load failed: {e}"));
    engine
}

fn num(engine: &mut RuleEngine, expr: &str) -> f64 {
    match engine.evaluate(expr).unwrap_or_else(|e| panic!("{expr}: {e}")) {
        Value::Num(n) => n,
        Value::Str(s) => panic!("{expr}: expected number, got '{s}'"),
    }
}

// =========================================================================
// DEFINE
// =========================================================================

#[test]
fn define_and_evaluate() {
    let mut e = engine("DEFINE ⊕ WITH ((a-1)*(a-2))/2 + 1");
    assert_eq!(num(&mut e, "6 ⊕ 6"), 11.0);
    assert_eq!(num(&mut e, "8 ⊕ 8"), 22.0);
}

#[test]
fn define_overwrites_silently() {
    let mut e = engine("DEFINE ⊕ WITH a+b\nDEFINE ⊕ WITH a*b");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 12.0);
}

#[test]
fn define_keyword_is_case_insensitive() {
    let mut e = engine("define ⊕ with a+b");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
}

#[test]
fn define_without_with_is_rejected() {
    let mut e = RuleEngine::new();
    let err = e.load_rules("DEFINE ⊕ a+b").unwrap_err();
    assert!(matches!(err, OplawError::BadDirective(_)));
}

#[test]
fn define_with_bad_law_is_rejected() {
    let mut e = RuleEngine::new();
    assert!(e.load_rules("DEFINE ⊕ WITH open(a)").is_err());
    assert!(e.load_rules("DEFINE ⊕ WITH a +").is_err());
}

// =========================================================================
// REPLACE
// =========================================================================

#[test]
fn replace_swaps_the_law() {
    let mut e = engine("DEFINE ⊕ WITH a+b\nREPLACE ⊕ WITH a-b");
    assert_eq!(num(&mut e, "10 ⊕ 4"), 6.0);
}

#[test]
fn replace_unknown_operation_fails() {
    let mut e = RuleEngine::new();
    let err = e.load_rules("REPLACE ⊕ WITH a+b").unwrap_err();
    assert!(matches!(err, OplawError::UnknownOperation(_)));
}

#[test]
fn replace_preserves_the_enabled_flag() {
    let mut e = engine("DEFINE ⊕ WITH a+b\nDISABLE ⊕\nREPLACE ⊕ WITH a*b");
    assert!(matches!(
        e.evaluate("3 ⊕ 4").unwrap_err(),
        OplawError::UndefinedOrDisabledOperation(_)
    ));

    // The swapped-in law shows up once the operation is re-enabled.
    e.load_rules("ENABLE ⊕").unwrap();
    assert_eq!(num(&mut e, "3 ⊕ 4"), 12.0);
}

#[test]
fn replace_collapses_a_multi_law_spec() {
    let dsl = "SELECT ⊗ WITH { a+b ; a*b } USING ORIENTATION -\n\
               REPLACE ⊗ WITH a-b";
    let mut e = engine(dsl);
    assert_eq!(num(&mut e, "10 ⊗ 4"), 6.0);
    assert_eq!(e.operations(), vec![("⊗", 1, true)]);
}

// =========================================================================
// DELETE
// =========================================================================

#[test]
fn delete_removes_the_operation() {
    let mut e = engine("DEFINE ⊕ WITH a+b\nDELETE ⊕");
    let err = e.evaluate("3 ⊕ 4").unwrap_err();
    assert!(matches!(err, OplawError::UndefinedOrDisabledOperation(_)));
}

#[test]
fn delete_is_idempotent() {
    let mut e = engine("DEFINE ⊕ WITH a+b");
    e.load_rules("DELETE ⊕").unwrap();
    e.load_rules("DELETE ⊕").unwrap();
    e.load_rules("DELETE τ").unwrap(); // never defined
}

// =========================================================================
// ENABLE / DISABLE
// =========================================================================

#[test]
fn disable_then_enable_round_trip() {
    let mut e = engine("DEFINE ⊕ WITH a+b\nDISABLE ⊕");
    let err = e.evaluate("3 ⊕ 4").unwrap_err();
    assert!(matches!(err, OplawError::UndefinedOrDisabledOperation(_)));

    e.load_rules("ENABLE ⊕").unwrap();
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
}

#[test]
fn enable_disable_unknown_operation_fails() {
    let mut e = RuleEngine::new();
    assert!(matches!(
        e.load_rules("ENABLE ⊕").unwrap_err(),
        OplawError::UnknownOperation(_)
    ));
    assert!(matches!(
        e.load_rules("DISABLE ⊕").unwrap_err(),
        OplawError::UnknownOperation(_)
    ));
}

#[test]
fn disabled_operation_keeps_its_law() {
    let mut e = engine("DEFINE ⊕ WITH a*b\nDISABLE ⊕\nENABLE ⊕");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 12.0);
}

// =========================================================================
// SELECT
// =========================================================================

#[test]
fn select_orientation_plus_takes_the_first_law() {
    let mut e = engine("SELECT ⊕ WITH { a+b ; a*b } USING ORIENTATION +");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
}

#[test]
fn select_orientation_minus_takes_the_last_law() {
    let mut e = engine("SELECT ⊕ WITH { a+b ; a*b } USING ORIENTATION -");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 12.0);
}

#[test]
fn select_reports_law_count() {
    let e = engine("SELECT ⊕ WITH { a+b ; a*b ; a-b } USING ORIENTATION +");
    assert_eq!(e.operations(), vec![("⊕", 3, true)]);
}

#[test]
fn select_accepts_a_brace_glued_to_with() {
    let mut e = engine("SELECT ⊕ WITH{ a+b ; a*b } USING ORIENTATION +");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
}

#[test]
fn select_tolerates_stray_semicolons() {
    let mut e = engine("SELECT ⊕ WITH { a+b ; ; a*b ; } USING ORIENTATION -");
    assert_eq!(num(&mut e, "3 ⊕ 4"), 12.0);
}

#[test]
fn select_rejects_malformed_lines() {
    for line in [
        "SELECT ⊕ WITH a+b USING ORIENTATION +",      // no braces
        "SELECT ⊕ WITH { a+b ; a*b }",                 // no orientation
        "SELECT ⊕ WITH { a+b } USING ORIENTATION *",   // bad orientation
        "SELECT ⊕ WITH { } USING ORIENTATION +",       // empty body
    ] {
        let mut e = RuleEngine::new();
        let err = e.load_rules(line).unwrap_err();
        assert!(matches!(err, OplawError::BadDirective(_)), "{line}");
    }
}

#[test]
fn select_rejects_a_bad_member_law() {
    let mut e = RuleEngine::new();
    assert!(e
        .load_rules("SELECT ⊕ WITH { a+b ; c+d } USING ORIENTATION +")
        .is_err());
}

// =========================================================================
// Directive text handling
// =========================================================================

#[test]
fn comments_blanks_and_unknown_keywords_are_ignored() {
    let dsl = "# heading comment\n\
               \n\
               DEFINE ⊕ WITH a+b\n\
               NOTE this line has no meaning\n\
                  # indented comment\n\
               FROBNICATE ⊕\n";
    let mut e = engine(dsl);
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
    assert_eq!(e.operations().len(), 1);
}

#[test]
fn later_batches_extend_the_same_registry() {
    let mut e = engine("DEFINE ⊕ WITH a+b");
    e.load_rules("DEFINE ⊗ WITH a*b").unwrap();
    assert_eq!(num(&mut e, "3 ⊕ 4"), 7.0);
    assert_eq!(num(&mut e, "3 ⊗ 4"), 12.0);
}

#[test]
fn engines_are_independent() {
    let mut first = engine("DEFINE ⊕ WITH a+b");
    let mut second = RuleEngine::new();
    assert_eq!(num(&mut first, "3 ⊕ 4"), 7.0);
    assert!(second.evaluate("3 ⊕ 4").is_err());
}

// =========================================================================
// Expression errors
// =========================================================================

#[test]
fn expression_must_have_three_tokens() {
    let mut e = engine("DEFINE ⊕ WITH a+b");
    for expr in ["3 ⊕", "3", "", "3 ⊕ 4 5", "3⊕4"] {
        let err = e.evaluate(expr).unwrap_err();
        assert!(matches!(err, OplawError::MalformedExpression(_)), "{expr:?}");
    }
}

#[test]
fn operands_must_be_numeric() {
    let mut e = engine("DEFINE ⊕ WITH a+b");
    assert!(matches!(
        e.evaluate("x ⊕ 4").unwrap_err(),
        OplawError::NonNumericOperand(_)
    ));
    assert!(matches!(
        e.evaluate("3 ⊕ y").unwrap_err(),
        OplawError::NonNumericOperand(_)
    ));
}

#[test]
fn negative_and_fractional_operands_parse() {
    let mut e = engine("DEFINE ⊕ WITH a+b");
    assert_eq!(num(&mut e, "-3 ⊕ 4"), 1.0);
    assert_eq!(num(&mut e, "1.5 ⊕ 2.5"), 4.0);
}

#[test]
fn error_message_names_the_token_as_written() {
    let mut e = RuleEngine::new();
    let err = e.evaluate("3 oplus 4").unwrap_err();
    assert!(err.to_string().contains("oplus"));
}

#[test]
fn string_results_come_back_as_values() {
    let mut e = engine("DEFINE Δ WITH 'nested' if a<b else 'separated'");
    assert_eq!(e.evaluate("2 Δ 3").unwrap(), Value::Str("nested".into()));
    assert_eq!(e.evaluate("3 Δ 2").unwrap(), Value::Str("separated".into()));
}
