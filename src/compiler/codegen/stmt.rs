//! Statement lowering. Statements report whether control flow already
//! ended in an unconditional `return`, so callers know when a fall-through
//! terminator would be dead.

use crate::ast::{Expr, Stmt, VarType};
use inkwell::FloatPredicate;

use super::Flow;
use crate::compiler::{Compiler, Variable};

impl<'ctx> Compiler<'ctx> {
    pub fn codegen_stmt(&mut self, stmt: &Stmt) -> Option<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.codegen_expr(expr)?;
                Some(Flow::Continues)
            }

            Stmt::Return(expr) => {
                let val = self.codegen_expr(expr)?;
                let ret_ty = self
                    .cur_function()
                    .get_type()
                    .get_return_type()
                    .expect("declared functions always return a value");
                let val = self.coerce_or_log(val, ret_ty, "return value")?;
                self.builder.build_return(Some(&val)).expect("build return");
                Some(Flow::Returns)
            }

            Stmt::VarDecl { name, ty, init } => {
                let ir_type = self.llvm_type(*ty);
                // Evaluate the initialiser before the name becomes visible.
                let init_val = match init {
                    Some(expr) => {
                        let val = self.codegen_expr(expr)?;
                        self.coerce_or_log(val, ir_type, &format!("initialiser of '{name}'"))?
                    }
                    None => self.zero_value(*ty),
                };
                let function = self.cur_function();
                let slot = self.entry_block_alloca(function, ir_type, name);
                self.builder.build_store(slot, init_val).expect("build store");
                self.variables.insert(
                    name.clone(),
                    Variable { decl_type: *ty, ir_type, slot },
                );
                Some(Flow::Continues)
            }

            Stmt::Block(stmts) => {
                for stmt in stmts {
                    if self.codegen_stmt(stmt)? == Flow::Returns {
                        // The rest of the block is unreachable; stop here.
                        return Some(Flow::Returns);
                    }
                }
                Some(Flow::Continues)
            }

            Stmt::If { cond, then_stmt, else_stmt } => {
                self.codegen_if(cond, then_stmt, else_stmt)
            }

            Stmt::For { var, start, end, step, body } => {
                self.codegen_for(var, start, end, step, body)
            }
        }
    }

    fn codegen_if(
        &mut self,
        cond: &Expr,
        then_stmt: &Stmt,
        else_stmt: &Stmt,
    ) -> Option<Flow> {
        let cond_val = self.codegen_expr(cond)?;
        let cond_bit = self.nonzero(cond_val)?;

        let function = self.cur_function();
        let then_bb = self.context.append_basic_block(function, "then");
        let else_bb = self.context.append_basic_block(function, "else");
        let merge_bb = self.context.append_basic_block(function, "ifcont");

        self.builder
            .build_conditional_branch(cond_bit, then_bb, else_bb)
            .expect("build cond branch");

        self.builder.position_at_end(then_bb);
        let then_flow = self.codegen_stmt(then_stmt)?;
        if then_flow == Flow::Continues {
            // Branch from wherever the branch's codegen left the cursor;
            // nested control flow may have moved it past then_bb.
            self.builder
                .build_unconditional_branch(merge_bb)
                .expect("build branch");
        }

        self.builder.position_at_end(else_bb);
        let else_flow = self.codegen_stmt(else_stmt)?;
        if else_flow == Flow::Continues {
            self.builder
                .build_unconditional_branch(merge_bb)
                .expect("build branch");
        }

        // Execution may continue at the merge point, so the statement as a
        // whole does not count as returned.
        self.builder.position_at_end(merge_bb);
        Some(Flow::Continues)
    }

    /// Loop layout (the body runs before the first condition check):
    /// ```text
    ///   store start -> var
    ///   br loop
    /// loop:
    ///   <body>
    ///   store (load var) + step -> var
    ///   br (end != 0.0), loop, afterloop
    /// afterloop:
    /// ```
    fn codegen_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: &Expr,
        body: &Stmt,
    ) -> Option<Flow> {
        let function = self.cur_function();
        let f64_ty = self.context.f64_type();

        // The loop variable is always a double.
        let slot = self.entry_block_alloca(function, f64_ty.into(), var);
        let start_val = self.codegen_expr(start)?;
        let start_val = self.coerce_or_log(start_val, f64_ty.into(), "for start value")?;
        self.builder.build_store(slot, start_val).expect("build store");

        let loop_bb = self.context.append_basic_block(function, "loop");
        let after_bb = self.context.append_basic_block(function, "afterloop");
        self.builder
            .build_unconditional_branch(loop_bb)
            .expect("build branch");
        self.builder.position_at_end(loop_bb);

        // The loop variable shadows any outer binding for the body only.
        let shadow = self.variables.insert(
            var.to_string(),
            Variable {
                decl_type: VarType::Double,
                ir_type: f64_ty.into(),
                slot,
            },
        );

        let result = self.codegen_for_body(slot, end, step, body, loop_bb, after_bb);

        match shadow {
            Some(old) => {
                self.variables.insert(var.to_string(), old);
            }
            None => {
                self.variables.remove(var);
            }
        }

        result?;
        self.builder.position_at_end(after_bb);
        Some(Flow::Continues)
    }

    fn codegen_for_body(
        &mut self,
        slot: inkwell::values::PointerValue<'ctx>,
        end: &Expr,
        step: &Expr,
        body: &Stmt,
        loop_bb: inkwell::basic_block::BasicBlock<'ctx>,
        after_bb: inkwell::basic_block::BasicBlock<'ctx>,
    ) -> Option<()> {
        let f64_ty = self.context.f64_type();
        let body_flow = self.codegen_stmt(body)?;

        // A body that always returns needs no step, condition or back-edge;
        // its own terminator is already in place.
        if body_flow == Flow::Returns {
            return Some(());
        }

        let step_val = self.codegen_expr(step)?;
        let step_val = self
            .coerce_or_log(step_val, f64_ty.into(), "for step value")?
            .into_float_value();
        let cur = self
            .builder
            .build_load(slot, "loopvar")
            .expect("build load")
            .into_float_value();
        let next = self
            .builder
            .build_float_add(cur, step_val, "nextvar")
            .expect("build fadd");
        self.builder.build_store(slot, next).expect("build store");

        let end_val = self.codegen_expr(end)?;
        let end_val = self
            .coerce_or_log(end_val, f64_ty.into(), "for end condition")?
            .into_float_value();
        let cond = self
            .builder
            .build_float_compare(
                FloatPredicate::ONE,
                end_val,
                f64_ty.const_float(0.0),
                "loopcond",
            )
            .expect("build fcmp");
        self.builder
            .build_conditional_branch(cond, loop_bb, after_bb)
            .expect("build cond branch");
        Some(())
    }
}
