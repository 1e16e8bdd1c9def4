//! Expression lowering. Every expression yields an LLVM value or the `None`
//! sentinel after reporting a diagnostic.

use inkwell::module::Linkage;
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum};
use inkwell::{FloatPredicate, IntPredicate};

use crate::ast::Expr;

use super::{basic_from_meta, log_error};
use crate::compiler::Compiler;

impl<'ctx> Compiler<'ctx> {
    /// Lower a single expression to LLVM IR.
    pub fn codegen_expr(&mut self, expr: &Expr) -> Option<BasicValueEnum<'ctx>> {
        match expr {
            // Integer literals are bytes.
            Expr::IntLit(v) => Some(self.context.i8_type().const_int(*v as u64, false).into()),

            Expr::FpLit(v) => Some(self.context.f64_type().const_float(*v).into()),

            Expr::StrLit(bytes) => Some(self.codegen_str_literal(bytes)),

            // ── variable reference ──────────────────────────────────
            Expr::Variable(name) => {
                let var = match self.variables.get(name) {
                    Some(var) => *var,
                    None => return log_error(format!("unknown variable '{name}'")),
                };
                Some(
                    self.builder
                        .build_load(var.slot, name)
                        .expect("build load"),
                )
            }

            Expr::Unary { op, operand } => self.codegen_unary(*op, operand),

            // Assignment gets its own path: the left-hand side is a slot,
            // not a value.
            Expr::Binary { op: b'=', lhs, rhs } => self.codegen_assign(lhs, rhs),

            Expr::Binary { op, lhs, rhs } => self.codegen_binary(*op, lhs, rhs),

            Expr::Call { callee, args } => self.codegen_call(callee, args),
        }
    }

    /// A string literal becomes a private constant null-terminated byte
    /// array; the expression's value is the address of its first byte.
    fn codegen_str_literal(&mut self, bytes: &[u8]) -> BasicValueEnum<'ctx> {
        let array = self.context.const_string(bytes, true);
        let global = self.module.add_global(array.get_type(), None, "str");
        global.set_initializer(&array);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);
        global.as_pointer_value().into()
    }

    fn codegen_unary(&mut self, op: u8, operand: &Expr) -> Option<BasicValueEnum<'ctx>> {
        match op {
            // &x is the stack slot's address itself; no load happens.
            b'&' => {
                let Expr::Variable(name) = operand else {
                    return log_error("cannot take the address of a non-variable expression");
                };
                match self.variables.get(name) {
                    Some(var) => Some(var.slot.into()),
                    None => log_error(format!("unknown variable '{name}'")),
                }
            }
            // *p loads the pointer value, then the byte it points at.
            b'*' => {
                let val = self.codegen_expr(operand)?;
                let BasicValueEnum::PointerValue(ptr) = val else {
                    return log_error("cannot dereference a non-pointer value");
                };
                Some(
                    self.builder
                        .build_load(ptr, "deref")
                        .expect("build load"),
                )
            }
            other => log_error(format!("invalid unary operator '{}'", other as char)),
        }
    }

    /// `lhs = rhs`. The left-hand side must name a variable; this is checked
    /// before the right-hand side is evaluated so a typo does not leave dead
    /// code behind. Yields the stored value.
    fn codegen_assign(&mut self, lhs: &Expr, rhs: &Expr) -> Option<BasicValueEnum<'ctx>> {
        let Expr::Variable(name) = lhs else {
            return log_error("left-hand side of '=' must be a variable");
        };
        let var = match self.variables.get(name) {
            Some(var) => *var,
            None => return log_error(format!("unknown variable '{name}'")),
        };

        let rhs_val = self.codegen_expr(rhs)?;
        let stored = self.coerce_or_log(rhs_val, var.ir_type, &format!("assignment to '{name}'"))?;
        self.builder.build_store(var.slot, stored).expect("build store");
        Some(stored)
    }

    fn codegen_binary(&mut self, op: u8, lhs: &Expr, rhs: &Expr) -> Option<BasicValueEnum<'ctx>> {
        let lhs_val = self.codegen_expr(lhs)?;
        let rhs_val = self.codegen_expr(rhs)?;

        // Any double operand promotes the operation to floating point;
        // otherwise both operands must be integers.
        if lhs_val.is_float_value() || rhs_val.is_float_value() {
            let f64_ty = self.context.f64_type();
            let l = self
                .coerce_or_log(lhs_val, f64_ty.into(), "binary operation")?
                .into_float_value();
            let r = self
                .coerce_or_log(rhs_val, f64_ty.into(), "binary operation")?
                .into_float_value();
            match op {
                b'+' => Some(self.builder.build_float_add(l, r, "addtmp").expect("build fadd").into()),
                b'-' => Some(self.builder.build_float_sub(l, r, "subtmp").expect("build fsub").into()),
                b'*' => Some(self.builder.build_float_mul(l, r, "multmp").expect("build fmul").into()),
                b'<' => Some(
                    self.builder
                        .build_float_compare(FloatPredicate::ULT, l, r, "cmptmp")
                        .expect("build fcmp")
                        .into(),
                ),
                b'!' => Some(
                    self.builder
                        .build_float_compare(FloatPredicate::UNE, l, r, "netmp")
                        .expect("build fcmp")
                        .into(),
                ),
                other => log_error(format!("invalid binary operator '{}'", other as char)),
            }
        } else if lhs_val.is_int_value() && rhs_val.is_int_value() {
            let mut l = lhs_val.into_int_value();
            let mut r = rhs_val.into_int_value();
            // Equalise widths (bool widens to byte) before operating.
            let lw = l.get_type().get_bit_width();
            let rw = r.get_type().get_bit_width();
            if lw < rw {
                l = self.builder.build_int_z_extend(l, r.get_type(), "zext").expect("build zext");
            } else if rw < lw {
                r = self.builder.build_int_z_extend(r, l.get_type(), "zext").expect("build zext");
            }
            match op {
                b'+' => Some(self.builder.build_int_add(l, r, "addtmp").expect("build add").into()),
                b'-' => Some(self.builder.build_int_sub(l, r, "subtmp").expect("build sub").into()),
                b'*' => Some(self.builder.build_int_mul(l, r, "multmp").expect("build mul").into()),
                b'<' => Some(
                    self.builder
                        .build_int_compare(IntPredicate::ULT, l, r, "cmptmp")
                        .expect("build icmp")
                        .into(),
                ),
                b'!' => Some(
                    self.builder
                        .build_int_compare(IntPredicate::NE, l, r, "netmp")
                        .expect("build icmp")
                        .into(),
                ),
                other => log_error(format!("invalid binary operator '{}'", other as char)),
            }
        } else {
            log_error("type mismatch in binary operation")
        }
    }

    /// `callee(arg, ...)`. Resolves the callee across modules, checks arity,
    /// and coerces each argument to the declared parameter type.
    fn codegen_call(&mut self, callee: &str, args: &[Expr]) -> Option<BasicValueEnum<'ctx>> {
        let callee_fn = match self.resolve_function(callee) {
            Some(f) => f,
            None => return log_error(format!("unknown function '{callee}'")),
        };

        let expected = callee_fn.count_params() as usize;
        if expected != args.len() {
            return log_error(format!(
                "'{callee}' expects {expected} argument(s), got {}",
                args.len()
            ));
        }

        let param_types = callee_fn.get_type().get_param_types();
        let mut call_args: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for (arg, param_ty) in args.iter().zip(param_types) {
            let val = self.codegen_expr(arg)?;
            let target = basic_from_meta(param_ty.into())
                .expect("declared parameter types are basic");
            let val = self.coerce_or_log(val, target, &format!("call to '{callee}'"))?;
            call_args.push(val.into());
        }

        let call = self
            .builder
            .build_call(callee_fn, &call_args, "calltmp")
            .expect("build call");
        Some(
            call.try_as_basic_value()
                .left()
                .expect("declared functions always return a value"),
        )
    }
}
