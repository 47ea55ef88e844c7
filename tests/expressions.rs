//! Evaluation and compilation of the same expressions must agree.

use infix::{Constant, Engine, LocalMap, NoMembers, NoVariables, StaticType, Variables};
use pretty_assertions::assert_eq;

mod cases;

use cases::{BINDINGS, CASES};

fn variables(engine: &Engine) -> Variables {
    let mut vars = Variables::new();
    for (name, literal, _) in BINDINGS {
        let value = engine.evaluate(literal, &mut NoVariables).unwrap();
        vars.insert(*name, value);
    }
    vars
}

fn locals() -> LocalMap {
    let mut locals = LocalMap::new();
    for (name, _, ty) in BINDINGS {
        locals.declare(*name, ty.parse().unwrap()).unwrap();
    }
    locals
}

#[test]
fn test_evaluated_values() {
    let engine = Engine::default();
    let mut vars = variables(&engine);

    for case in CASES.iter() {
        let value = engine.evaluate(case.source, &mut vars);
        assert_eq!(
            value.map(|v| v.to_string()),
            Ok(case.value.to_string()),
            "{}",
            case.source
        );
    }
}

#[test]
fn test_compiled_types() {
    let engine = Engine::default();
    let locals = locals();

    for case in CASES.iter() {
        let code = engine.compile(case.source, &locals, &NoMembers).unwrap();
        assert_eq!(code.result_type.to_string(), case.ty, "{}", case.source);
    }
}

#[test]
fn test_value_kind_matches_compiled_type() {
    let engine = Engine::default();
    let mut vars = variables(&engine);
    let locals = locals();

    for case in CASES.iter() {
        let value = engine.evaluate(case.source, &mut vars).unwrap();
        let code = engine.compile(case.source, &locals, &NoMembers).unwrap();
        assert_eq!(value.kind(), code.result_type.runtime_kind(), "{}", case.source);
    }
}

#[test]
fn test_slots_follow_declaration_order() {
    let locals = locals();
    // long and double take two slots each
    let slots: Vec<u16> = ["i", "l", "f", "d", "b", "s", "n"]
        .iter()
        .map(|name| locals.get(name).unwrap().slot)
        .collect();
    assert_eq!(slots, vec![0, 1, 3, 4, 6, 7, 8]);
    assert_eq!(locals.slots_used(), 9);
    assert_eq!(locals.get("n").unwrap().ty, "Integer".parse::<StaticType>().unwrap());
}

#[test]
fn test_null_literal() {
    let engine = Engine::default();
    assert_eq!(
        engine.evaluate("null", &mut NoVariables).unwrap(),
        Constant::Null
    );
    let code = engine.compile("null", &LocalMap::new(), &NoMembers).unwrap();
    assert_eq!(code.result_type, StaticType::NULL);
}
