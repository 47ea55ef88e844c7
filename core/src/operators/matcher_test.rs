//! Tests for the operator matcher.

use super::*;

fn assignment_table() -> OperatorTable<&'static str> {
    OperatorTable::new([("=", "="), ("==", "=="), ("!=", "!=")])
}

#[test]
fn test_start_without_candidates() {
    let table = assignment_table();
    assert_eq!(table.start('+').unwrap_err(), NoMatcherFound('+'));
}

#[test]
fn test_double_equals_after_two_chars() {
    let table = assignment_table();
    let mut matcher = table.start('=').unwrap();
    assert!(matcher.has_next('='));
    matcher.consume('=');
    assert_eq!(matcher.matched(), Some("=="));
    assert_eq!(matcher.complete(), Some("=="));
}

#[test]
fn test_single_equals_is_ambiguous_while_longer_candidate_lives() {
    let table = assignment_table();
    let matcher = table.start('=').unwrap();
    assert!(matcher.has_next('='));
    assert_eq!(matcher.matched(), None);
}

#[test]
fn test_complete_settles_on_prefix() {
    let table = assignment_table();
    let matcher = table.start('=').unwrap();
    assert!(!matcher.has_next(' '));
    assert_eq!(matcher.complete(), Some("="));
}

#[test]
fn test_has_next_does_not_mutate() {
    let table = assignment_table();
    let matcher = table.start('!').unwrap();
    assert!(matcher.has_next('='));
    assert!(!matcher.has_next('!'));
    assert_eq!(matcher.consumed(), 1);
    // `!` alone is not an operator in this table
    assert_eq!(matcher.complete(), None);
}

#[test]
fn test_consume_mismatch_kills_all_candidates() {
    let table = assignment_table();
    let mut matcher = table.start('!').unwrap();
    matcher.consume('x');
    assert!(!matcher.is_alive());
    assert_eq!(matcher.matched(), None);
    assert_eq!(matcher.complete(), None);
}

#[test]
fn test_three_char_shift() {
    let catalog = crate::operators::Catalog::new();
    let mut matcher = catalog.binary.start('>').unwrap();
    assert_eq!(matcher.matched(), None);
    matcher.consume('>');
    assert_eq!(matcher.matched(), None, ">> and >>> both alive");
    assert_eq!(matcher.complete(), Some(BinaryOp::Shr));
    matcher.consume('>');
    assert_eq!(matcher.matched(), Some(BinaryOp::UShr));
}

#[test]
fn test_less_than_family() {
    let catalog = crate::operators::Catalog::new();
    let matcher = catalog.binary.start('<').unwrap();
    assert!(matcher.has_next('<'));
    assert!(matcher.has_next('='));
    assert!(!matcher.has_next('>'));
    assert_eq!(matcher.complete(), Some(BinaryOp::Lt));
}

#[test]
fn test_runtime_registration_rebuilds_groups() {
    let mut table = assignment_table();
    table.insert("===", "===");
    let mut matcher = table.start('=').unwrap();
    matcher.consume('=');
    assert_eq!(matcher.matched(), None);
    assert!(matcher.has_next('='));

    assert_eq!(table.remove("==="), Some("==="));
    assert_eq!(table.remove("==="), None);
    let mut matcher = table.start('=').unwrap();
    matcher.consume('=');
    assert_eq!(matcher.matched(), Some("=="));
}

#[test]
fn test_unary_and_binary_tables_are_separate() {
    let catalog = crate::operators::Catalog::new();
    assert_eq!(catalog.unary.get("!"), Some(UnaryOp::Not));
    assert_eq!(catalog.binary.get("!"), None);
    assert_eq!(catalog.binary.get("!="), Some(BinaryOp::Ne));
    assert!(catalog.unary.starts_operator('~'));
    assert!(!catalog.binary.starts_operator('~'));
}
