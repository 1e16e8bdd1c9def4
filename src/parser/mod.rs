//! Recursive-descent parser for the Kal language.
//!
//! Grammar:
//! ```text
//! program        = (definition | extern_decl | top_level_expr | ';')*
//! definition     = "def" prototype statement
//! extern_decl    = "extern" prototype
//! prototype      = type IDENT "(" (type IDENT ("," type IDENT)*)? ")"
//! type           = "double" | "byte" | "bool" | "byte_ptr"
//! statement      = if_stmt | for_stmt | block | var_decl | return_stmt | expr
//! if_stmt        = "if" expr "then" statement "else" statement
//! for_stmt       = "for" IDENT "=" expr "," expr ("," expr)? statement
//! block          = "{" (statement ";"?)* "}"
//! var_decl       = "var" IDENT type ("=" expr)?
//! return_stmt    = "return" expr
//! expr           = primary (binop primary)*        # precedence climbing
//! primary        = INT | FP | STR | IDENT | IDENT "(" args ")"
//!                | "(" expr ")" | ("&" | "*") primary
//! ```
//!
//! Binary operators and precedence: `=` 2, `<` and `!` 10, `+` and `-` 20,
//! `*` 40. Every production reads the shared current-token cursor, consumes
//! what it recognises, and leaves the first unconsumed token in the cursor.
//! Errors are reported once and surface as `None`.

use crate::ast::{Expr, FunctionDef, Prototype, Stmt, VarType, ANON_FN};
use crate::errors::{self, Phase};
use crate::lexer::{Lexer, Token};

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    /// The token every production is currently looking at.
    cur: Token,
}

impl<'src> Parser<'src> {
    /// Create a parser and prime the cursor with the first token.
    pub fn new(lexer: Lexer<'src>) -> Self {
        let mut parser = Self { lexer, cur: Token::Eof };
        parser.advance();
        parser
    }

    // ── cursor helpers ──────────────────────────────────────────────

    /// The current token.
    pub fn current(&self) -> Token {
        self.cur
    }

    /// Read another token from the lexer into the cursor.
    pub fn advance(&mut self) -> Token {
        self.cur = self.lexer.next_token();
        self.cur
    }

    /// Report a parse error and yield the `None` sentinel.
    fn error<T>(&self, message: impl Into<String>) -> Option<T> {
        errors::error(Phase::Parser, message);
        None
    }

    // ── top-level productions ───────────────────────────────────────

    /// definition = "def" prototype statement
    pub fn parse_definition(&mut self) -> Option<FunctionDef> {
        self.advance(); // eat 'def'
        let proto = self.parse_prototype()?;
        let body = self.parse_statement()?;
        Some(FunctionDef { proto, body })
    }

    /// extern_decl = "extern" prototype
    pub fn parse_extern(&mut self) -> Option<Prototype> {
        self.advance(); // eat 'extern'
        self.parse_prototype()
    }

    /// Wrap a bare top-level expression in an anonymous nullary function
    /// returning `byte`, whose body is `return <expr>`.
    pub fn parse_top_level_expr(&mut self) -> Option<FunctionDef> {
        let expr = self.parse_expression()?;
        let proto = Prototype {
            name: ANON_FN.to_string(),
            ret: VarType::Byte,
            params: Vec::new(),
        };
        Some(FunctionDef { proto, body: Stmt::Return(expr) })
    }

    /// prototype = type IDENT "(" (type IDENT ("," type IDENT)*)? ")"
    fn parse_prototype(&mut self) -> Option<Prototype> {
        let ret = self.parse_type()?;

        if self.cur != Token::Identifier {
            return self.error("expected function name in prototype");
        }
        let name = self.lexer.identifier.clone();
        self.advance(); // eat the function name

        if self.cur != Token::Char(b'(') {
            return self.error("expected '(' in prototype");
        }
        self.advance(); // eat '('

        let mut params = Vec::new();
        while self.cur != Token::Char(b')') {
            if !params.is_empty() {
                if self.cur != Token::Char(b',') {
                    return self.error("expected ')' or ',' in parameter list");
                }
                self.advance(); // eat ','
            }
            let ty = self.parse_type()?;
            if self.cur != Token::Identifier {
                return self.error("expected parameter name in prototype");
            }
            params.push((self.lexer.identifier.clone(), ty));
            self.advance(); // eat the parameter name
        }
        self.advance(); // eat ')'

        Some(Prototype { name, ret, params })
    }

    fn parse_type(&mut self) -> Option<VarType> {
        if self.cur != Token::Identifier {
            return self.error("expected a type name");
        }
        let Some(ty) = VarType::from_name(&self.lexer.identifier) else {
            errors::error_with_hint(
                Phase::Parser,
                format!("unknown type name '{}'", self.lexer.identifier),
                "valid types: double, byte, bool, byte_ptr",
            );
            return None;
        };
        self.advance(); // eat the type name
        Some(ty)
    }

    // ── statements ──────────────────────────────────────────────────

    pub fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur {
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::BlockOpen => self.parse_block(),
            Token::Var => self.parse_var_decl(),
            Token::Return => self.parse_return(),
            _ => Some(Stmt::Expr(self.parse_expression()?)),
        }
    }

    /// if_stmt = "if" expr "then" statement "else" statement
    fn parse_if(&mut self) -> Option<Stmt> {
        self.advance(); // eat 'if'
        let cond = self.parse_expression()?;

        if self.cur != Token::Then {
            return self.error("expected 'then'");
        }
        self.advance(); // eat 'then'
        let then_stmt = Box::new(self.parse_statement()?);

        if self.cur != Token::Else {
            return self.error("expected 'else'");
        }
        self.advance(); // eat 'else'
        let else_stmt = Box::new(self.parse_statement()?);

        Some(Stmt::If { cond, then_stmt, else_stmt })
    }

    /// for_stmt = "for" IDENT "=" expr "," expr ("," expr)? statement
    fn parse_for(&mut self) -> Option<Stmt> {
        self.advance(); // eat 'for'

        if self.cur != Token::Identifier {
            return self.error("expected identifier after 'for'");
        }
        let var = self.lexer.identifier.clone();
        self.advance(); // eat the identifier

        if self.cur != Token::Char(b'=') {
            return self.error("expected '=' after for loop variable");
        }
        self.advance(); // eat '='

        let start = self.parse_expression()?;
        if self.cur != Token::Char(b',') {
            return self.error("expected ',' after for start value");
        }
        self.advance(); // eat ','

        let end = self.parse_expression()?;

        // The step value is optional; missing means 1.0.
        let step = if self.cur == Token::Char(b',') {
            self.advance(); // eat ','
            self.parse_expression()?
        } else {
            Expr::FpLit(1.0)
        };

        let body = Box::new(self.parse_statement()?);
        Some(Stmt::For { var, start, end, step, body })
    }

    /// block = "{" (statement ";"?)* "}"
    fn parse_block(&mut self) -> Option<Stmt> {
        self.advance(); // eat '{'
        let mut stmts = Vec::new();
        loop {
            match self.cur {
                Token::Semi => {
                    self.advance(); // eat ';'
                }
                Token::BlockClose => {
                    self.advance(); // eat '}'
                    break;
                }
                Token::Eof => return self.error("unexpected end of input inside block"),
                _ => stmts.push(self.parse_statement()?),
            }
        }
        Some(Stmt::Block(stmts))
    }

    /// var_decl = "var" IDENT type ("=" expr)?
    fn parse_var_decl(&mut self) -> Option<Stmt> {
        self.advance(); // eat 'var'

        if self.cur != Token::Identifier {
            return self.error("expected identifier after 'var'");
        }
        let name = self.lexer.identifier.clone();
        self.advance(); // eat the identifier

        let ty = self.parse_type()?;

        // Initial value. Absent means zero-initialised.
        let init = if self.cur == Token::Char(b'=') {
            self.advance(); // eat '='
            Some(self.parse_expression()?)
        } else {
            None
        };

        Some(Stmt::VarDecl { name, ty, init })
    }

    /// return_stmt = "return" expr
    fn parse_return(&mut self) -> Option<Stmt> {
        self.advance(); // eat 'return'
        Some(Stmt::Return(self.parse_expression()?))
    }

    // ── expressions ─────────────────────────────────────────────────

    pub fn parse_expression(&mut self) -> Option<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_bin_op_rhs(0, lhs)
    }

    /// Precedence of the current token as a binary operator, or -1 for
    /// anything that is not one (which terminates the climbing loop).
    fn token_precedence(&self) -> i32 {
        match self.cur {
            Token::Char(b'=') => 2,
            Token::Char(b'<') | Token::Char(b'!') => 10,
            Token::Char(b'+') | Token::Char(b'-') => 20,
            Token::Char(b'*') => 40,
            _ => -1,
        }
    }

    /// Keep consuming binary operators of at least `expr_prec` precedence,
    /// growing `lhs` left-associatively.
    fn parse_bin_op_rhs(&mut self, expr_prec: i32, mut lhs: Expr) -> Option<Expr> {
        loop {
            let tok_prec = self.token_precedence();
            if tok_prec < expr_prec {
                return Some(lhs);
            }

            // The precedence check guarantees the cursor holds an operator.
            let op = match self.cur {
                Token::Char(c) => c,
                _ => return Some(lhs),
            };
            self.advance(); // eat the operator

            let mut rhs = self.parse_primary()?;

            // If the operator after rhs binds tighter, let it take rhs first.
            let next_prec = self.token_precedence();
            if tok_prec < next_prec {
                rhs = self.parse_bin_op_rhs(tok_prec + 1, rhs)?;
            }

            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        match self.cur {
            Token::IntLit => {
                let v = self.lexer.int_val;
                self.advance();
                Some(Expr::IntLit(v))
            }
            Token::FpLit => {
                let v = self.lexer.fp_val;
                self.advance();
                Some(Expr::FpLit(v))
            }
            Token::StrLit => {
                let bytes = self.lexer.str_val.clone();
                self.advance();
                Some(Expr::StrLit(bytes))
            }
            Token::Identifier => self.parse_identifier_expr(),
            Token::Char(b'(') => self.parse_paren_expr(),
            Token::Char(op @ (b'&' | b'*')) => {
                self.advance(); // eat the unary operator
                let operand = Box::new(self.parse_primary()?);
                Some(Expr::Unary { op, operand })
            }
            other => self.error(format!(
                "unexpected token when expecting an expression: {other:?}"
            )),
        }
    }

    /// IDENT, or IDENT "(" (expr ("," expr)*)? ")" for a call.
    fn parse_identifier_expr(&mut self) -> Option<Expr> {
        let name = self.lexer.identifier.clone();
        self.advance(); // eat the identifier

        // Plain variable reference?
        if self.cur != Token::Char(b'(') {
            return Some(Expr::Variable(name));
        }

        self.advance(); // eat '('
        let mut args = Vec::new();
        let mut first = true;
        loop {
            if self.cur == Token::Char(b')') {
                self.advance(); // eat ')'
                break;
            }
            if !first {
                if self.cur != Token::Char(b',') {
                    return self.error("expected ')' or ',' in argument list");
                }
                self.advance(); // eat ','
            }
            first = false;
            args.push(self.parse_expression()?);
        }
        Some(Expr::Call { callee: name, args })
    }

    /// "(" expr ")"
    fn parse_paren_expr(&mut self) -> Option<Expr> {
        self.advance(); // eat '('
        let expr = self.parse_expression()?;
        if self.cur != Token::Char(b')') {
            return self.error("missing ')'");
        }
        self.advance(); // eat ')'
        Some(expr)
    }
}
