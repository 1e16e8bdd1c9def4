use kal::lexer::{Lexer, Token};

fn lex_all(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source.bytes());
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        if tok == Token::Eof {
            return tokens;
        }
        tokens.push(tok);
    }
}

#[test]
fn lexes_keywords() {
    assert_eq!(
        lex_all("def extern if then else for in return var"),
        vec![
            Token::Def,
            Token::Extern,
            Token::If,
            Token::Then,
            Token::Else,
            Token::For,
            Token::In,
            Token::Return,
            Token::Var,
        ]
    );
}

#[test]
fn lexes_identifiers_with_payload() {
    let mut lexer = Lexer::new("foo _bar x9".bytes());
    assert_eq!(lexer.next_token(), Token::Identifier);
    assert_eq!(lexer.identifier, "foo");
    assert_eq!(lexer.next_token(), Token::Identifier);
    assert_eq!(lexer.identifier, "_bar");
    assert_eq!(lexer.next_token(), Token::Identifier);
    assert_eq!(lexer.identifier, "x9");
    assert_eq!(lexer.next_token(), Token::Eof);
}

#[test]
fn lexes_integer_and_float_literals() {
    let mut lexer = Lexer::new("42 3.25 .5".bytes());
    assert_eq!(lexer.next_token(), Token::IntLit);
    assert_eq!(lexer.int_val, 42);
    assert_eq!(lexer.next_token(), Token::FpLit);
    assert_eq!(lexer.fp_val, 3.25);
    assert_eq!(lexer.next_token(), Token::FpLit);
    assert_eq!(lexer.fp_val, 0.5);
}

#[test]
fn lexes_structure_and_raw_chars() {
    assert_eq!(
        lex_all("{ } ; ( , ) = + - * < ! &"),
        vec![
            Token::BlockOpen,
            Token::BlockClose,
            Token::Semi,
            Token::Char(b'('),
            Token::Char(b','),
            Token::Char(b')'),
            Token::Char(b'='),
            Token::Char(b'+'),
            Token::Char(b'-'),
            Token::Char(b'*'),
            Token::Char(b'<'),
            Token::Char(b'!'),
            Token::Char(b'&'),
        ]
    );
}

#[test]
fn no_whitespace_needed_around_operators() {
    assert_eq!(
        lex_all("a+b"),
        vec![Token::Identifier, Token::Char(b'+'), Token::Identifier]
    );
}

#[test]
fn skips_line_comments() {
    assert_eq!(
        lex_all("1 # the rest is noise ;;; def\n2"),
        vec![Token::IntLit, Token::IntLit]
    );
}

#[test]
fn comment_at_end_of_input_hits_eof() {
    assert_eq!(lex_all("7 # trailing"), vec![Token::IntLit]);
}

#[test]
fn lexes_plain_string_literal() {
    let mut lexer = Lexer::new(r#""hello""#.bytes());
    assert_eq!(lexer.next_token(), Token::StrLit);
    assert_eq!(lexer.str_val, b"hello");
}

#[test]
fn decodes_hex_string_literal() {
    let mut lexer = Lexer::new(r#""\x4142""#.bytes());
    assert_eq!(lexer.next_token(), Token::StrLit);
    assert_eq!(lexer.str_val, vec![0x41, 0x42]);
}

#[test]
fn hex_literal_can_encode_a_null_byte() {
    let mut lexer = Lexer::new(r#""\x00""#.bytes());
    assert_eq!(lexer.next_token(), Token::StrLit);
    assert_eq!(lexer.str_val, vec![0]);
}

#[test]
fn odd_length_hex_literal_yields_empty_payload() {
    let mut lexer = Lexer::new(r#""\x123""#.bytes());
    assert_eq!(lexer.next_token(), Token::StrLit);
    assert!(lexer.str_val.is_empty());
}

#[test]
fn unterminated_string_yields_empty_payload() {
    let mut lexer = Lexer::new(r#""abc"#.bytes());
    assert_eq!(lexer.next_token(), Token::StrLit);
    assert!(lexer.str_val.is_empty());
    assert_eq!(lexer.next_token(), Token::Eof);
}

#[test]
fn eof_is_sticky() {
    let mut lexer = Lexer::new("x".bytes());
    assert_eq!(lexer.next_token(), Token::Identifier);
    assert_eq!(lexer.next_token(), Token::Eof);
    assert_eq!(lexer.next_token(), Token::Eof);
}
