//! Code generation — walks the AST and emits LLVM IR.

use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum};
use inkwell::values::{BasicValueEnum, FunctionValue};
use inkwell::{FloatPredicate, IntPredicate};

use crate::errors::{self, Phase};

use super::Compiler;

mod expr;
mod func;
mod stmt;

/// How a statement left control flow: falling through to whatever comes
/// next, or already terminated by an unconditional `return`. A caller must
/// not append a fall-through branch after [`Flow::Returns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continues,
    Returns,
}

/// Report a codegen error and yield the `None` sentinel.
pub(crate) fn log_error<T>(message: impl Into<String>) -> Option<T> {
    errors::error(Phase::Codegen, message);
    None
}

impl<'ctx> Compiler<'ctx> {
    /// The function the builder is currently emitting into.
    pub(crate) fn cur_function(&self) -> FunctionValue<'ctx> {
        self.builder
            .get_insert_block()
            .expect("builder is positioned inside a function")
            .get_parent()
            .expect("insertion block belongs to a function")
    }

    /// Allocate a stack slot in the entry block of `function`, ahead of any
    /// code, so mem2reg can promote it.
    pub(crate) fn entry_block_alloca(
        &self,
        function: FunctionValue<'ctx>,
        ty: BasicTypeEnum<'ctx>,
        name: &str,
    ) -> inkwell::values::PointerValue<'ctx> {
        let tmp = self.context.create_builder();
        let entry = function
            .get_first_basic_block()
            .expect("function has an entry block");
        match entry.get_first_instruction() {
            Some(first) => tmp.position_before(&first),
            None => tmp.position_at_end(entry),
        }
        tmp.build_alloca(ty, name).expect("build alloca")
    }

    /// Convert `val` to `target` where the numeric types allow it. Integers
    /// widen and narrow by zero-extension and truncation; integer to double
    /// and back use the unsigned conversions. `None` means the types do not
    /// convert (pointers never do).
    pub(crate) fn coerce(
        &self,
        val: BasicValueEnum<'ctx>,
        target: BasicTypeEnum<'ctx>,
    ) -> Option<BasicValueEnum<'ctx>> {
        if val.get_type() == target {
            return Some(val);
        }
        match (val, target) {
            (BasicValueEnum::IntValue(v), BasicTypeEnum::FloatType(t)) => Some(
                self.builder
                    .build_unsigned_int_to_float(v, t, "i2f")
                    .expect("build int to fp")
                    .into(),
            ),
            (BasicValueEnum::FloatValue(v), BasicTypeEnum::IntType(t)) => Some(
                self.builder
                    .build_float_to_unsigned_int(v, t, "f2i")
                    .expect("build fp to int")
                    .into(),
            ),
            (BasicValueEnum::IntValue(v), BasicTypeEnum::IntType(t)) => {
                let from = v.get_type().get_bit_width();
                let to = t.get_bit_width();
                let widened = if from < to {
                    self.builder.build_int_z_extend(v, t, "zext")
                } else {
                    self.builder.build_int_truncate(v, t, "trunc")
                };
                Some(widened.expect("build int resize").into())
            }
            _ => None,
        }
    }

    /// [`Compiler::coerce`], reporting a type mismatch on failure.
    pub(crate) fn coerce_or_log(
        &self,
        val: BasicValueEnum<'ctx>,
        target: BasicTypeEnum<'ctx>,
        what: &str,
    ) -> Option<BasicValueEnum<'ctx>> {
        match self.coerce(val, target) {
            Some(v) => Some(v),
            None => log_error(format!("type mismatch in {what}")),
        }
    }

    /// Compare `val` against the zero of its own type, yielding an `i1`
    /// suitable for a conditional branch.
    pub(crate) fn nonzero(&self, val: BasicValueEnum<'ctx>) -> Option<inkwell::values::IntValue<'ctx>> {
        match val {
            BasicValueEnum::IntValue(v) => Some(
                self.builder
                    .build_int_compare(
                        IntPredicate::NE,
                        v,
                        v.get_type().const_int(0, false),
                        "cond",
                    )
                    .expect("build int compare"),
            ),
            BasicValueEnum::FloatValue(v) => Some(
                self.builder
                    .build_float_compare(
                        FloatPredicate::ONE,
                        v,
                        v.get_type().const_float(0.0),
                        "cond",
                    )
                    .expect("build float compare"),
            ),
            _ => log_error("condition must be a numeric value"),
        }
    }
}

/// Function parameter and return types are always basic (never void or
/// metadata), so this lookup cannot miss for Kal-declared functions.
pub(crate) fn basic_from_meta(ty: BasicMetadataTypeEnum<'_>) -> Option<BasicTypeEnum<'_>> {
    match ty {
        BasicMetadataTypeEnum::FloatType(t) => Some(t.as_basic_type_enum()),
        BasicMetadataTypeEnum::IntType(t) => Some(t.as_basic_type_enum()),
        BasicMetadataTypeEnum::PointerType(t) => Some(t.as_basic_type_enum()),
        _ => None,
    }
}
