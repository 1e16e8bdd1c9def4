//! End-to-end tests: source in, JIT-evaluated top-level results out.

use inkwell::context::Context;

use kal::compiler::Compiler;
use kal::driver::Driver;
use kal::lexer::Lexer;
use kal::parser::Parser;

fn run(source: &str) -> Vec<u8> {
    let context = Context::create();
    Driver::new(&context, source.bytes(), false).run()
}

#[test]
fn adds_one_to_a_double() {
    let results = run("def double foo(double x) return x + 1.0; foo(2.0);");
    assert_eq!(results, vec![3]);
}

#[test]
fn squares_a_byte() {
    let results = run("def byte sq(byte x) return x * x; sq(7);");
    assert_eq!(results, vec![49]);
}

#[test]
fn recursion_through_if_then_else() {
    let results = run(
        "def byte f(byte n) if n < 1 then return 0 else return f(n - 1) + 2; f(5);",
    );
    assert_eq!(results, vec![10]);
}

#[test]
fn block_with_locals() {
    let results = run("def byte g() { var a byte = 3; var b byte = 4; return a + b; } g();");
    assert_eq!(results, vec![7]);
}

#[test]
fn address_of_and_dereference() {
    let results = run(
        "def byte h(byte_ptr p) return *p; \
         def byte t() { var v byte = 42; return h(&v); } \
         t();",
    );
    assert_eq!(results, vec![42]);
}

#[test]
fn streq_runtime_helper_on_hex_literals() {
    let results = run(
        r#"extern byte streq(byte_ptr a, byte la, byte_ptr b, byte lb);
           streq("\x4142", 2, "\x4142", 2);
           streq("\x4142", 2, "\x4143", 2);"#,
    );
    assert_eq!(results, vec![1, 0]);
}

#[test]
fn my_strcmp_runtime_helper() {
    let results = run(
        r#"extern byte my_strcmp(byte_ptr a, byte la, byte_ptr b, byte lb);
           my_strcmp("\x4141", 2, "\x4142", 2);"#,
    );
    assert_eq!(results, vec![0xff]);
}

#[test]
fn putchard_runtime_helper_returns_zero() {
    let results = run("extern double putchard(double c); putchard(65.0);");
    assert_eq!(results, vec![0]);
}

#[test]
fn call_resolves_across_modules() {
    // Each top-level expression is its own module; the definition lives in
    // an earlier JIT-resident module both times.
    let results = run("def byte sq(byte x) return x * x; sq(3); sq(4);");
    assert_eq!(results, vec![9, 16]);
}

#[test]
fn empty_block_body_returns_typed_zero() {
    let results = run("def double e() {} e();");
    assert_eq!(results, vec![0]);
}

#[test]
fn comparison_yields_one_bit_result() {
    let results = run(
        "def byte lt(double a, double b) return a < b; lt(1.0, 2.0); lt(2.0, 1.0);",
    );
    assert_eq!(results, vec![1, 0]);
}

#[test]
fn precedence_in_evaluation() {
    assert_eq!(run("1 + 2 * 3;"), vec![7]);
    assert_eq!(run("(1 + 2) * 3;"), vec![9]);
}

#[test]
fn chained_assignment_is_rejected() {
    // a = b = 0 parses as (a = b) = 0, whose left side is not a variable;
    // the whole definition is dropped and the driver carries on.
    let results = run(
        "def byte f() { var a byte; var b byte; a = b = 0; return a; } 4;",
    );
    assert_eq!(results, vec![4]);
}

#[test]
fn assignment_yields_its_value_and_stores() {
    let results = run("def byte f() { var a byte; return (a = 5) + a; } f();");
    assert_eq!(results, vec![10]);
}

#[test]
fn codegen_error_recovers_for_later_items() {
    // 'q' is undeclared: the definition is dropped, the driver moves on.
    let results = run("def byte f() return q; 5;");
    assert_eq!(results, vec![5]);
}

#[test]
fn parse_error_skips_a_token_and_recovers() {
    // 'def 9' fails in the prototype; the driver skips the offending token
    // and picks up at the next item.
    let results = run("def 9; 6;");
    assert_eq!(results, vec![6]);
}

#[test]
fn for_loop_counts_iterations() {
    let results = run(
        "def byte loop9() { var acc byte = 0; \
           for i = 1.0, i < 10.0 { acc = acc + 1; }; \
           return acc; } \
         loop9();",
    );
    // The body runs before the first condition check: i = 1 through 9.
    assert_eq!(results, vec![9]);
}

#[test]
fn loop_variable_shadows_and_restores_outer_binding() {
    let results = run(
        "extern double putchard(double c); \
         def byte shadowed() { var i byte = 77; \
           for i = 1.0, i < 3.0 putchard(i); \
           return i; } \
         shadowed();",
    );
    assert_eq!(results, vec![77]);
}

#[test]
fn bool_local_participates_in_byte_arithmetic() {
    let results = run("def byte f() { var t bool = 1; return t + 4; } f();");
    assert_eq!(results, vec![5]);
}

#[test]
fn string_literal_becomes_null_terminated_constant_array() {
    let context = Context::create();
    let mut compiler = Compiler::new(&context);
    let mut parser = Parser::new(Lexer::new(
        r#"def byte_ptr s() return "ABCD""#.bytes(),
    ));
    let def = parser.parse_definition().expect("parse should succeed");
    compiler.codegen_function(def).expect("codegen should succeed");

    let ir = compiler.ir_string();
    // Four bytes of content plus the terminating null.
    assert!(ir.contains("[5 x i8]"), "missing constant array in:\n{ir}");
    assert!(ir.contains("private"), "string global should be private:\n{ir}");
}

#[test]
fn arity_mismatch_is_rejected() {
    let results = run("def byte sq(byte x) return x * x; def byte bad() return sq(1, 2); 8;");
    assert_eq!(results, vec![8]);
}
