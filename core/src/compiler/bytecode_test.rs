//! Tests for the bytecode compiler.

use crate::{
    Error, Result, String,
    compiler::{self, LocalMap, MemberTable, MemberTypes, NoMembers, StaticType, TypeKind},
    format,
    operand::{Constant, Operand},
    operators::{BinaryOp, UnaryOp},
    solver::{self, NoVariables, Token, TokenStream},
    syntax,
    test_utils::init_test_logging,
    vm::{Code, ComparisonOp, Instruction, Primitive},
};
use pretty_assertions::assert_eq;

use Instruction::*;

/// Locals shared by every test. Primitive long and double take two slots.
fn locals() -> LocalMap {
    let mut locals = LocalMap::new();
    for (name, ty) in [
        ("i", "int"),         // 0
        ("l", "long"),        // 1..2
        ("d", "double"),      // 3..4
        ("f", "float"),       // 5
        ("s", "String"),      // 6
        ("b", "boolean"),     // 7
        ("oi", "Integer"),    // 8
        ("ol", "Long"),       // 9
        ("ob", "Boolean"),    // 10
        ("ns", "String?"),    // 11
    ] {
        locals.declare(name, ty.parse().unwrap()).unwrap();
    }
    locals.declare("p", StaticType::object("Point")).unwrap(); // 12
    locals
}

fn points() -> MemberTable {
    MemberTable::new()
        .with("Point", "x", StaticType::INT)
        .with("Point", "label", StaticType::boxed(TypeKind::Str))
}

fn compile_with(source: &str, members: &dyn MemberTypes) -> Result<Code> {
    init_test_logging();
    let stream = syntax::parse(source)?;
    compiler::compile(stream, &locals(), members)
}

fn compile(source: &str) -> Result<Code> {
    compile_with(source, &NoMembers)
}

/// Instructions without the trailing `Return`.
fn body(source: &str) -> Vec<Instruction> {
    let code = compile(source).unwrap();
    assert_eq!(code.instructions.last(), Some(&Return));
    let mut instructions = code.instructions;
    instructions.pop();
    instructions
}

// ============================================================================
// Literals and locals
// ============================================================================

#[test]
fn test_compile_simple_integer() {
    let code = compile("42").unwrap();

    assert_eq!(code.instructions, vec![ConstInt(42), Return]);
    assert_eq!(code.max_stack_size, 1);
    assert_eq!(code.result_type, StaticType::INT);
    assert!(code.constants.is_empty());
}

#[test]
fn test_large_literals_use_the_pool() {
    let code = compile("1000").unwrap();
    assert_eq!(code.instructions, vec![ConstLoad(0), Return]);
    assert_eq!(code.constants, vec![Constant::Int(1000)]);

    assert_eq!(body("-128"), vec![ConstInt(-128)]);
    assert_eq!(body("true"), vec![ConstTrue]);
    assert_eq!(body("null"), vec![ConstNull]);
}

#[test]
fn test_locals_load_their_slot() {
    assert_eq!(body("i"), vec![LoadLocal(0)]);
    assert_eq!(body("d"), vec![LoadLocal(3)]);
    assert_eq!(body("p"), vec![LoadLocal(12)]);
}

#[test]
fn test_constant_pool_is_deduplicated() {
    let code = compile("1000 + 1000 + 2.5 + 2.5").unwrap();
    assert_eq!(
        code.constants,
        vec![Constant::Int(1000), Constant::Double(2.5)]
    );
    assert_eq!(
        code.instructions,
        vec![
            ConstLoad(0),
            ConstLoad(0),
            IntBinOp(b'+'),
            I2D,
            ConstLoad(1),
            DoubleBinOp(b'+'),
            ConstLoad(1),
            DoubleBinOp(b'+'),
            Return,
        ]
    );

    let code = compile(r#""a" + "a""#).unwrap();
    assert_eq!(code.constants, vec![Constant::str("a")]);
}

// ============================================================================
// Arithmetic, widening and boxing
// ============================================================================

#[test]
fn test_compile_addition() {
    let code = compile("1 + 2").unwrap();
    assert_eq!(
        code.instructions,
        vec![ConstInt(1), ConstInt(2), IntBinOp(b'+'), Return]
    );
    assert_eq!(code.max_stack_size, 2);
}

#[test]
fn test_widening_follows_promotion() {
    assert_eq!(
        body("i + l"),
        vec![LoadLocal(0), I2L, LoadLocal(1), LongBinOp(b'+')]
    );
    assert_eq!(
        body("f * l"),
        vec![LoadLocal(5), LoadLocal(1), L2F, FloatBinOp(b'*')]
    );
    assert_eq!(
        body("f - d"),
        vec![LoadLocal(5), F2D, LoadLocal(3), DoubleBinOp(b'-')]
    );
    assert_eq!(compile("i / f").unwrap().result_type, StaticType::FLOAT);
}

#[test]
fn test_wrappers_unbox_and_rebox() {
    // One primitive side: primitive result
    let code = compile("oi + 1").unwrap();
    assert_eq!(
        code.instructions,
        vec![LoadLocal(8), Unbox(Primitive::Int), ConstInt(1), IntBinOp(b'+'), Return]
    );
    assert_eq!(code.result_type, StaticType::INT);

    // Both wrappers: boxed result of the promoted kind
    let code = compile("oi + ol").unwrap();
    assert_eq!(
        code.instructions,
        vec![
            LoadLocal(8),
            Unbox(Primitive::Int),
            I2L,
            LoadLocal(9),
            Unbox(Primitive::Long),
            LongBinOp(b'+'),
            Box(Primitive::Long),
            Return,
        ]
    );
    assert_eq!(code.result_type, StaticType::boxed(TypeKind::Long));
}

#[test]
fn test_stack_depth() {
    assert_eq!(compile("((1 + 2) + 3) + 4").unwrap().max_stack_size, 2);
    assert_eq!(compile("1 + (2 + (3 + 4))").unwrap().max_stack_size, 4);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_concat_stringifies_non_strings() {
    let code = compile("s + i").unwrap();
    assert_eq!(
        code.instructions,
        vec![LoadLocal(6), LoadLocal(0), Stringify, Concat, Return]
    );
    assert_eq!(code.result_type, StaticType::STRING);

    // A nullable string may be null and is stringified too
    assert_eq!(
        body(r#""a" + ns"#),
        vec![ConstLoad(0), LoadLocal(11), Stringify, Concat]
    );
    assert_eq!(
        body("1 + 2 + s"),
        vec![ConstInt(1), ConstInt(2), IntBinOp(b'+'), Stringify, LoadLocal(6), Concat]
    );
}

// ============================================================================
// Comparisons and logic
// ============================================================================

#[test]
fn test_comparisons() {
    assert_eq!(
        body("i < d"),
        vec![LoadLocal(0), I2D, LoadLocal(3), DoubleCmpOp(ComparisonOp::Lt)]
    );
    assert_eq!(
        body("b == true"),
        vec![LoadLocal(7), ConstTrue, BoolCmpOp(ComparisonOp::Eq)]
    );
    assert_eq!(
        body("ob != b"),
        vec![
            LoadLocal(10),
            Unbox(Primitive::Boolean),
            LoadLocal(7),
            BoolCmpOp(ComparisonOp::Ne),
        ]
    );
    assert_eq!(
        body("s == null"),
        vec![LoadLocal(6), ConstNull, RefCmpOp(ComparisonOp::Eq)]
    );
    assert_eq!(compile("oi >= 1").unwrap().result_type, StaticType::BOOLEAN);
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let code = compile("b && i > 0").unwrap();
    assert_eq!(
        code.instructions,
        vec![
            LoadLocal(7),
            LoadLocal(0),
            ConstInt(0),
            IntCmpOp(ComparisonOp::Gt),
            And,
            Return,
        ]
    );
    assert_eq!(code.max_stack_size, 3);
    assert_eq!(body("b || ob"), vec![LoadLocal(7), LoadLocal(10), Unbox(Primitive::Boolean), Or]);
}

#[test]
fn test_boolean_bitwise() {
    let code = compile("b & ob").unwrap();
    assert_eq!(
        code.instructions,
        vec![LoadLocal(7), LoadLocal(10), Unbox(Primitive::Boolean), BoolBinOp(b'&'), Return]
    );
    assert_eq!(code.result_type, StaticType::BOOLEAN);
    assert_eq!(body("i ^ l"), vec![LoadLocal(0), I2L, LoadLocal(1), LongBinOp(b'^')]);
}

#[test]
fn test_shifts_keep_the_left_kind() {
    let code = compile("i << l").unwrap();
    assert_eq!(
        code.instructions,
        vec![LoadLocal(0), LoadLocal(1), L2I, IntBinOp(b'<'), Return]
    );
    assert_eq!(code.result_type, StaticType::INT);
    assert_eq!(body("l >>> 2"), vec![LoadLocal(1), ConstInt(2), LongBinOp(b'u')]);
}

#[test]
fn test_unary_operators() {
    let code = compile("-oi").unwrap();
    assert_eq!(code.instructions, vec![LoadLocal(8), Unbox(Primitive::Int), NegInt, Return]);
    assert_eq!(code.result_type, StaticType::INT);

    assert_eq!(body("+i"), vec![LoadLocal(0)]);
    assert_eq!(body("!b"), vec![LoadLocal(7), Not]);
    assert_eq!(body("~l"), vec![LoadLocal(1), BitNotLong]);
    assert_eq!(body("-d"), vec![LoadLocal(3), NegDouble]);
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_member_selection() {
    let code = compile_with("p.x + 1", &points()).unwrap();
    assert_eq!(
        code.instructions,
        vec![LoadLocal(12), GetMember(0), ConstInt(1), IntBinOp(b'+'), Return]
    );
    assert_eq!(code.names, vec![String::from("x")]);

    let code = compile_with("p.label + p.label", &points()).unwrap();
    assert_eq!(code.names.len(), 1);
    assert_eq!(code.result_type, StaticType::STRING);
}

#[test]
fn test_member_errors() {
    let err = compile_with("p.z", &points()).unwrap_err();
    assert_eq!(err, Error::unknown_reference("Point.z"));

    let err = compile_with("i.x", &points()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { op: ".", .. }), "{:?}", err);

    let err = compile("p.x").unwrap_err();
    assert_eq!(err, Error::unknown_reference("Point.x"));

    // p.(i + i): only a bare name may follow `.`
    let stream = TokenStream::from_prefix([
        Token::Binary(BinaryOp::Member),
        Token::from(Operand::reference("p")),
        Token::Binary(BinaryOp::Add),
        Token::from(Operand::reference("i")),
        Token::from(Operand::reference("i")),
    ]);
    let err = compiler::compile(stream, &locals(), &points()).unwrap_err();
    assert!(matches!(err, Error::MalformedExpression { .. }), "{:?}", err);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unknown_reference() {
    assert_eq!(compile("q + 1").unwrap_err(), Error::unknown_reference("q"));
    assert_eq!(compile("1 + q").unwrap_err(), Error::unknown_reference("q"));
}

#[test]
fn test_type_mismatch() {
    for (source, op) in [
        ("b + 1", "+"),
        ("s - 1", "-"),
        ("i && b", "&&"),
        ("d << 1", "<<"),
        ("f & 1", "&"),
        ("s < s", "<"),
        ("i == s", "=="),
        ("i == null", "=="),
        ("!i", "!"),
        ("~d", "~"),
        ("-s", "-"),
    ] {
        match compile(source) {
            Err(Error::TypeMismatch { op: actual, .. }) => assert_eq!(actual, op, "{}", source),
            other => panic!("{}: expected a type mismatch, got {:?}", source, other),
        }
    }
}

#[test]
fn test_malformed_streams() {
    let locals = locals();

    let err = compiler::compile(TokenStream::new(), &locals, &NoMembers).unwrap_err();
    assert!(matches!(err, Error::MalformedExpression { .. }));

    let leftover = TokenStream::from_prefix([Constant::Int(1), Constant::Int(2)]);
    let err = compiler::compile(leftover, &locals, &NoMembers).unwrap_err();
    assert!(matches!(err, Error::MalformedExpression { .. }));

    let deep = syntax::parse("-(-(-(1)))").unwrap();
    let err = compiler::compile_with_limits(deep, &locals, &NoMembers, 2).unwrap_err();
    assert!(matches!(err, Error::MalformedExpression { .. }));
}

/// Prefix tokens of a balanced `+` tree over `leaves`.
fn balanced_sum(leaves: &[Vec<Token>]) -> Vec<Token> {
    if let [leaf] = leaves {
        return leaf.clone();
    }
    let (left, right) = leaves.split_at(leaves.len() / 2);
    let mut tokens = vec![Token::Binary(BinaryOp::Add)];
    tokens.extend(balanced_sum(left));
    tokens.extend(balanced_sum(right));
    tokens
}

#[test]
fn test_too_many_constants() {
    let literals: Vec<Vec<Token>> = (0..=65536i64)
        .map(|v| vec![Token::from(Constant::Long(v))])
        .collect();

    let stream = TokenStream::from_prefix(balanced_sum(&literals));
    let err = compiler::compile(stream, &LocalMap::new(), &NoMembers).unwrap_err();
    assert_eq!(err, Error::TooManyConstants);

    // One fewer fills the pool exactly
    let stream = TokenStream::from_prefix(balanced_sum(&literals[..65536]));
    let code = compiler::compile(stream, &LocalMap::new(), &NoMembers).unwrap();
    assert_eq!(code.constants.len(), 65536);
    assert_eq!(code.result_type, StaticType::LONG);
}

#[test]
fn test_too_many_member_names() {
    let any_member = |_: &'static str, _: &str| -> Result<StaticType> { Ok(StaticType::INT) };
    let selections: Vec<Vec<Token>> = (0..=65536)
        .map(|n| {
            vec![
                Token::Binary(BinaryOp::Member),
                Token::from(Operand::reference("p")),
                Token::from(Operand::reference(format!("m{}", n))),
            ]
        })
        .collect();

    let stream = TokenStream::from_prefix(balanced_sum(&selections));
    let err = compiler::compile(stream, &locals(), &any_member).unwrap_err();
    assert_eq!(err, Error::TooManyConstants);
}

#[test]
fn test_deep_nesting_does_not_use_the_call_stack() {
    let mut tokens = vec![Token::Unary(UnaryOp::Neg); 100_000];
    tokens.push(Token::from(Operand::reference("i")));

    let stream = TokenStream::from_prefix(tokens.clone());
    let code = compiler::compile_with_limits(stream, &locals(), &NoMembers, 200_000).unwrap();
    assert_eq!(code.instructions.len(), 100_002);
    assert_eq!(code.instructions[0], LoadLocal(0));
    assert_eq!(code.max_stack_size, 1);

    let stream = TokenStream::from_prefix(tokens);
    let err = compiler::compile(stream, &locals(), &NoMembers).unwrap_err();
    assert!(matches!(err, Error::MalformedExpression { .. }));
}

// ============================================================================
// Agreement with the solver
// ============================================================================

#[test]
fn test_result_type_matches_evaluation() {
    for source in [
        "1 + 2L",
        "1 + 2.5F",
        "2.5F * 2.0",
        "7 / 2",
        r#""a" + 1"#,
        r#"1 + "a""#,
        "1 < 2",
        "1 == 1L",
        r#""a" == "a""#,
        "null == null",
        "true & false",
        "6 ^ 3L",
        "5 >> 1L",
        "~7L",
        "-2.5F",
        "!true",
    ] {
        let code = compiler::compile(syntax::parse(source).unwrap(), &LocalMap::new(), &NoMembers)
            .unwrap();
        let value = solver::solve(syntax::parse(source).unwrap(), &mut NoVariables).unwrap();
        assert_eq!(code.result_type.runtime_kind(), value.kind(), "{}", source);
    }
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_debug_listing() {
    let code = compile_with("p.x + 1000", &points()).unwrap();
    let listing = format!("{:?}", code);

    assert!(listing.contains("result_type: int"), "{}", listing);
    assert!(listing.contains("max_stack_size: 2"), "{}", listing);
    assert!(listing.contains("; Int(1000)"), "{}", listing);
    assert!(listing.contains("; .x"), "{}", listing);
}
