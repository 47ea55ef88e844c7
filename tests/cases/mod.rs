use once_cell::sync::Lazy;

/// An expression over the shared fixture bindings, with the value it
/// evaluates to and the static type it compiles to.
pub struct Case {
    pub source: &'static str,
    pub value: &'static str,
    pub ty: &'static str,
}

const fn case(source: &'static str, value: &'static str, ty: &'static str) -> Case {
    Case { source, value, ty }
}

/// Fixture bindings: name, literal value and declared type.
pub static BINDINGS: &[(&str, &str, &str)] = &[
    ("i", "7", "int"),
    ("l", "10000000000L", "long"),
    ("f", "0.5F", "float"),
    ("d", "2.25", "double"),
    ("b", "true", "boolean"),
    ("s", "\"hi\"", "String"),
    ("n", "3", "Integer"),
];

pub static CASES: Lazy<Vec<Case>> = Lazy::new(|| {
    vec![
        // Arithmetic and promotion
        case("i + 1", "8", "int"),
        case("i / 2", "3", "int"),
        case("-i % 4", "-3", "int"),
        case("i * l", "70000000000", "long"),
        case("i * f", "3.5", "float"),
        case("f + d", "2.75", "double"),
        case("d / f", "4.5", "double"),
        case("n * n", "9", "Integer"),
        case("n + 1", "4", "int"),
        case("2147483647 + 1", "-2147483648", "int"),
        // Strings
        case("s + i", "hi7", "String"),
        case("s + f", "hi0.5", "String"),
        case("i + 1 + s", "8hi", "String"),
        case("s + (i + 1)", "hi8", "String"),
        case("s + b + null", "hitruenull", "String"),
        // Bitwise and shifts
        case("i & 3", "3", "int"),
        case("i | 8L", "15", "long"),
        case("~i", "-8", "int"),
        case("-1 >>> 28", "15", "int"),
        case("1 << 33", "2", "int"),
        case("1L << 33", "8589934592", "long"),
        case("b ^ true", "false", "boolean"),
        // Comparison and logic
        case("i < d", "false", "boolean"),
        case("i == 7L", "true", "boolean"),
        case("n >= 3", "true", "boolean"),
        case("s == null", "false", "boolean"),
        case("s == \"hi\"", "true", "boolean"),
        case("!b || i > 5", "true", "boolean"),
        case("b && i != 7", "false", "boolean"),
    ]
});
