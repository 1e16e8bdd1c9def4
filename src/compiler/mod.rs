//! LLVM-backed compiler core for the Kal language.
//!
//! This is the top-level coordinator. The heavy lifting is split across:
//!
//! - [`codegen`] — AST → LLVM IR lowering
//! - [`jit`]     — the registry of JIT-compiled modules
//! - [`runtime`] — built-in helpers exposed to compiled code

use std::collections::HashMap;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::passes::PassManager;
use inkwell::types::BasicTypeEnum;
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use inkwell::AddressSpace;

use crate::ast::{Prototype, VarType};

pub mod codegen;
pub mod jit;
pub mod runtime;

use jit::{Jit, ModuleHandle};

/// A named local: its declared Kal type, the matching LLVM type, and the
/// stack slot in the owning function's entry block. Reads load from the
/// slot and writes store into it; mem2reg promotes the slots afterwards.
#[derive(Clone, Copy)]
pub struct Variable<'ctx> {
    pub decl_type: VarType,
    pub ir_type: BasicTypeEnum<'ctx>,
    pub slot: PointerValue<'ctx>,
}

// ═══════════════════════════════════════════════════════════════════
// Compiler
// ═══════════════════════════════════════════════════════════════════

/// Holds all state shared by the IR generator: the current module accepting
/// emission, the builder's insertion cursor, the per-function symbol table,
/// the cross-module prototype registry, and the JIT host.
pub struct Compiler<'ctx> {
    pub(crate) context: &'ctx Context,
    pub(crate) builder: Builder<'ctx>,
    pub(crate) module: Module<'ctx>,
    pub(crate) fpm: PassManager<FunctionValue<'ctx>>,
    /// Per-function symbol table; cleared on entry to each function.
    pub(crate) variables: HashMap<String, Variable<'ctx>>,
    /// Latest prototype declared for each function name. Survives module
    /// resets so later modules can re-declare functions that already live
    /// in the JIT; entries are never removed.
    pub(crate) protos: HashMap<String, Prototype>,
    jit: Jit<'ctx>,
}

const MODULE_NAME: &str = "kal";

impl<'ctx> Compiler<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        let module = context.create_module(MODULE_NAME);
        let builder = context.create_builder();
        let fpm = Self::make_fpm(&module);
        Self {
            context,
            builder,
            module,
            fpm,
            variables: HashMap::new(),
            protos: HashMap::new(),
            jit: Jit::new(),
        }
    }

    /// The fixed per-function optimisation pipeline, ending in a verifier.
    fn make_fpm(module: &Module<'ctx>) -> PassManager<FunctionValue<'ctx>> {
        let fpm = PassManager::create(module);
        fpm.add_promote_memory_to_register_pass();
        fpm.add_instruction_combining_pass();
        fpm.add_reassociate_pass();
        fpm.add_gvn_pass();
        fpm.add_cfg_simplification_pass();
        fpm.add_verifier_pass();
        fpm.initialize();
        fpm
    }

    /// Hand the current module to the JIT host and open a fresh one.
    /// The host owns the finished module from here on.
    pub fn submit_module(&mut self) -> Result<ModuleHandle, String> {
        let next = self.context.create_module(MODULE_NAME);
        let fpm = Self::make_fpm(&next);
        let finished = std::mem::replace(&mut self.module, next);
        self.fpm = fpm;
        self.jit.add_module(finished)
    }

    pub fn jit(&self) -> &Jit<'ctx> {
        &self.jit
    }

    pub fn jit_mut(&mut self) -> &mut Jit<'ctx> {
        &mut self.jit
    }

    /// Return the current module's LLVM IR as a string.
    pub fn ir_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    // ── type mapping ────────────────────────────────────────────

    /// Map a Kal type to the corresponding LLVM type.
    pub(crate) fn llvm_type(&self, ty: VarType) -> BasicTypeEnum<'ctx> {
        match ty {
            VarType::Double => self.context.f64_type().into(),
            VarType::Byte => self.context.i8_type().into(),
            VarType::Bool => self.context.bool_type().into(),
            VarType::BytePtr => self.context.i8_type().ptr_type(AddressSpace::default()).into(),
        }
    }

    /// The zero value a declaration of `ty` starts out holding.
    pub(crate) fn zero_value(&self, ty: VarType) -> BasicValueEnum<'ctx> {
        match ty {
            VarType::Double => self.context.f64_type().const_float(0.0).into(),
            VarType::Byte => self.context.i8_type().const_int(0, false).into(),
            VarType::Bool => self.context.bool_type().const_int(0, false).into(),
            VarType::BytePtr => self
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .const_null()
                .into(),
        }
    }
}
