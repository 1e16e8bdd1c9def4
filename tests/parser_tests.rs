use kal::ast::{Expr, FunctionDef, Stmt, VarType, ANON_FN};
use kal::lexer::Lexer;
use kal::parser::Parser;

fn parse_def(source: &str) -> Option<FunctionDef> {
    let mut parser = Parser::new(Lexer::new(source.bytes()));
    parser.parse_definition()
}

/// Parse a bare expression through the top-level wrapper and unwrap it.
fn parse_expr(source: &str) -> Expr {
    let mut parser = Parser::new(Lexer::new(source.bytes()));
    let def = parser.parse_top_level_expr().expect("parse should succeed");
    match def.body {
        Stmt::Return(expr) => expr,
        other => panic!("expected a return wrapper, got {other:?}"),
    }
}

#[test]
fn parses_prototype_types_and_params() {
    let def = parse_def("def double foo(double x, byte n, byte_ptr p) return x").unwrap();
    assert_eq!(def.proto.name, "foo");
    assert_eq!(def.proto.ret, VarType::Double);
    assert_eq!(
        def.proto.params,
        vec![
            ("x".to_string(), VarType::Double),
            ("n".to_string(), VarType::Byte),
            ("p".to_string(), VarType::BytePtr),
        ]
    );
}

#[test]
fn rejects_unknown_type_name() {
    assert!(parse_def("def quux foo() return 1").is_none());
}

#[test]
fn multiplication_binds_tighter_than_addition_and_comparison() {
    // a + b * c < d  parses as  (a + (b * c)) < d
    let expr = parse_expr("a + b * c < d");
    let Expr::Binary { op: b'<', lhs, .. } = expr else {
        panic!("expected '<' at the top");
    };
    let Expr::Binary { op: b'+', rhs, .. } = *lhs else {
        panic!("expected '+' under '<'");
    };
    assert!(matches!(*rhs, Expr::Binary { op: b'*', .. }));
}

#[test]
fn binary_operators_associate_left() {
    let expr = parse_expr("a - b - c");
    let Expr::Binary { op: b'-', lhs, rhs } = expr else {
        panic!("expected '-' at the top");
    };
    assert!(matches!(*lhs, Expr::Binary { op: b'-', .. }));
    assert_eq!(*rhs, Expr::Variable("c".to_string()));
}

#[test]
fn chained_assignment_parses_left_associated() {
    // Codegen rejects this shape later; the parser itself keeps climbing.
    let expr = parse_expr("a = b = c");
    let Expr::Binary { op: b'=', lhs, .. } = expr else {
        panic!("expected '=' at the top");
    };
    assert!(matches!(*lhs, Expr::Binary { op: b'=', .. }));
}

#[test]
fn parses_unary_operators() {
    assert!(matches!(parse_expr("&x"), Expr::Unary { op: b'&', .. }));
    assert!(matches!(parse_expr("*p"), Expr::Unary { op: b'*', .. }));
}

#[test]
fn parses_call_arguments() {
    let expr = parse_expr("f(1, x, g())");
    let Expr::Call { callee, args } = expr else {
        panic!("expected a call");
    };
    assert_eq!(callee, "f");
    assert_eq!(args.len(), 3);
    assert!(matches!(args[2], Expr::Call { .. }));
}

#[test]
fn top_level_expression_wraps_into_anonymous_byte_function() {
    let mut parser = Parser::new(Lexer::new("1 + 2".bytes()));
    let def = parser.parse_top_level_expr().unwrap();
    assert_eq!(def.proto.name, ANON_FN);
    assert_eq!(def.proto.ret, VarType::Byte);
    assert!(def.proto.params.is_empty());
    assert!(matches!(def.body, Stmt::Return(_)));
}

#[test]
fn if_requires_then_and_else() {
    assert!(parse_def("def byte f() if 1 then return 1").is_none());
    assert!(parse_def("def byte f() if 1 return 1 else return 2").is_none());
    assert!(parse_def("def byte f() if 1 then return 1 else return 2").is_some());
}

#[test]
fn for_without_step_defaults_to_one() {
    let def = parse_def("def byte f() for i = 1.0, i < 9.0 putchard(i)").unwrap();
    let Stmt::For { step, .. } = def.body else {
        panic!("expected a for statement");
    };
    assert_eq!(step, Expr::FpLit(1.0));
}

#[test]
fn var_decl_with_and_without_initialiser() {
    let def = parse_def("def byte f() { var a byte = 3; var p byte_ptr; return a; }").unwrap();
    let Stmt::Block(stmts) = def.body else {
        panic!("expected a block body");
    };
    assert!(matches!(
        &stmts[0],
        Stmt::VarDecl { ty: VarType::Byte, init: Some(_), .. }
    ));
    assert!(matches!(
        &stmts[1],
        Stmt::VarDecl { ty: VarType::BytePtr, init: None, .. }
    ));
}

#[test]
fn block_allows_and_ignores_stray_semicolons() {
    let def = parse_def("def byte f() { ; return 1; ; }").unwrap();
    let Stmt::Block(stmts) = def.body else {
        panic!("expected a block body");
    };
    assert_eq!(stmts.len(), 1);
}

#[test]
fn unclosed_block_is_an_error() {
    assert!(parse_def("def byte f() { return 1;").is_none());
}

#[test]
fn pretty_print_round_trips() {
    let sources = [
        "def byte g(byte x) { var a byte = 3; if ((a+x)<7) then return a else return x; }",
        "def double foo(double x) return (x+1.0)",
        "def byte h(byte_ptr p) return *p",
        "def byte loop() { for i = 1.0, (i<9.0), 2.0 putchard(i); return 0; }",
    ];
    for source in sources {
        let printed = parse_def(source).expect("parse should succeed").to_string();
        let reparsed = parse_def(&printed)
            .unwrap_or_else(|| panic!("pretty output failed to reparse: {printed}"));
        assert_eq!(printed, reparsed.to_string());
    }
}

#[test]
fn hex_string_literals_round_trip_through_printing() {
    let printed = parse_def(r#"def byte f() return streq("\x0001", 2, "AB", 2)"#)
        .expect("parse should succeed")
        .to_string();
    let reparsed = parse_def(&printed).expect("pretty output should reparse");
    assert_eq!(printed, reparsed.to_string());
}
