//! The top-level loop: pull tokens, dispatch on the leading keyword, hand
//! each finished item to the IR generator, and run top-level expressions
//! through the JIT.

use inkwell::context::Context;

use crate::ast::ANON_FN;
use crate::compiler::Compiler;
use crate::errors::{self, Phase};
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;

pub struct Driver<'ctx, 'src> {
    parser: Parser<'src>,
    compiler: Compiler<'ctx>,
    interactive: bool,
    /// Every value a top-level expression evaluated to, in source order.
    results: Vec<u8>,
}

impl<'ctx, 'src> Driver<'ctx, 'src> {
    pub fn new(
        context: &'ctx Context,
        input: impl Iterator<Item = u8> + 'src,
        interactive: bool,
    ) -> Self {
        if interactive {
            prompt();
        }
        Self {
            // Constructing the parser primes the first token, which is why
            // the prompt goes out first.
            parser: Parser::new(Lexer::new(input)),
            compiler: Compiler::new(context),
            interactive,
            results: Vec::new(),
        }
    }

    /// Run until end of input. Returns the evaluated top-level results.
    pub fn run(mut self) -> Vec<u8> {
        loop {
            match self.parser.current() {
                Token::Eof => return self.results,
                Token::Semi => {
                    // Ignore top-level semicolons.
                    self.parser.advance();
                    continue;
                }
                Token::Def => self.handle_definition(),
                Token::Extern => self.handle_extern(),
                _ => self.handle_top_level_expr(),
            }
            if self.interactive {
                prompt();
            }
        }
    }

    fn handle_definition(&mut self) {
        let Some(def) = self.parser.parse_definition() else {
            // Skip one token for error recovery.
            self.parser.advance();
            return;
        };
        let Some(function) = self.compiler.codegen_function(def) else {
            return;
        };
        errors::info("read function definition:");
        function.print_to_stderr();

        // The function's code lives in the JIT from now on; open a fresh
        // module for whatever comes next.
        if let Err(e) = self.compiler.submit_module() {
            errors::fatal(Phase::Jit, e);
        }
    }

    fn handle_extern(&mut self) {
        let Some(proto) = self.parser.parse_extern() else {
            self.parser.advance();
            return;
        };
        let function = self.compiler.codegen_extern(proto);
        errors::info("read extern:");
        function.print_to_stderr();
    }

    fn handle_top_level_expr(&mut self) {
        let Some(def) = self.parser.parse_top_level_expr() else {
            self.parser.advance();
            return;
        };
        let Some(function) = self.compiler.codegen_function(def) else {
            return;
        };
        errors::info("read a top-level expression:");
        function.print_to_stderr();

        let handle = match self.compiler.submit_module() {
            Ok(handle) => handle,
            Err(e) => errors::fatal(Phase::Jit, e),
        };

        let Some(addr) = self.compiler.jit().find_symbol(ANON_FN) else {
            errors::fatal(Phase::Jit, "anonymous expression vanished from the JIT");
        };
        // The wrapper takes no arguments and returns a byte.
        let result = unsafe {
            let f: extern "C" fn() -> u8 = std::mem::transmute(addr);
            f()
        };
        errors::info(format!("evaluated to: {result}"));
        self.results.push(result);

        // The expression has been evaluated; its module is no longer needed.
        self.compiler.jit_mut().remove_module(handle);
    }
}

fn prompt() {
    eprint!("ready> ");
}
