//! Function-level codegen: prototypes, definitions, and cross-module
//! function resolution through the prototype registry.

use inkwell::types::BasicMetadataTypeEnum;
use inkwell::types::BasicType;
use inkwell::values::{BasicValueEnum, FunctionValue};

use crate::ast::{FunctionDef, Prototype};
use crate::errors::{self, Phase};

use super::{log_error, Flow};
use crate::compiler::{Compiler, Variable};

impl<'ctx> Compiler<'ctx> {
    /// Emit `proto` into the current module as an external declaration.
    fn declare_prototype(&self, proto: &Prototype) -> FunctionValue<'ctx> {
        let param_types: Vec<BasicMetadataTypeEnum> = proto
            .params
            .iter()
            .map(|(_, ty)| self.llvm_type(*ty).into())
            .collect();
        let fn_type = self.llvm_type(proto.ret).fn_type(&param_types, false);
        let function = self.module.add_function(&proto.name, fn_type, None);

        for (i, (name, _)) in proto.params.iter().enumerate() {
            if let Some(param) = function.get_nth_param(i as u32) {
                set_value_name(param, name);
            }
        }
        function
    }

    /// Declare an `extern` prototype and remember it in the registry.
    pub fn codegen_extern(&mut self, proto: Prototype) -> FunctionValue<'ctx> {
        let name = proto.name.clone();
        self.protos.insert(name.clone(), proto);
        self.resolve_function(&name)
            .expect("prototype was just registered")
    }

    /// Find `name` for a call site. Order: the current module; then the
    /// prototype registry, whose entry is re-declared into the current module
    /// (the definition may live in an earlier JIT-resident module). `None`
    /// means the function is unknown.
    pub fn resolve_function(&mut self, name: &str) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = self.module.get_function(name) {
            return Some(function);
        }
        let proto = self.protos.get(name)?.clone();
        Some(self.declare_prototype(&proto))
    }

    /// Lower a function definition. Consumes the prototype (it moves into
    /// the registry), so this runs at most once per definition.
    ///
    /// On a body error the half-built function is erased from the module so
    /// the name can be defined again; the registry entry stays.
    pub fn codegen_function(&mut self, def: FunctionDef) -> Option<FunctionValue<'ctx>> {
        let FunctionDef { proto, body } = def;
        let name = proto.name.clone();
        let params = proto.params.clone();
        let ret = proto.ret;
        self.protos.insert(name.clone(), proto);

        let function = self.resolve_function(&name)?;
        if function.count_basic_blocks() > 0 {
            return log_error(format!("function '{name}' cannot be redefined"));
        }
        if function.count_params() as usize != params.len() {
            return log_error(format!(
                "definition of '{name}' conflicts with an earlier declaration"
            ));
        }

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        // Fresh symbol table; copy each parameter into its own stack slot so
        // it is writeable like any other local.
        self.variables.clear();
        for (i, (param_name, param_ty)) in params.iter().enumerate() {
            let arg = function
                .get_nth_param(i as u32)
                .expect("declaration matches the prototype");
            set_value_name(arg, param_name);
            let ir_type = self.llvm_type(*param_ty);
            let slot = self.entry_block_alloca(function, ir_type, param_name);
            self.builder.build_store(slot, arg).expect("build store");
            self.variables.insert(
                param_name.clone(),
                Variable { decl_type: *param_ty, ir_type, slot },
            );
        }

        let flow = match self.codegen_stmt(&body) {
            Some(flow) => flow,
            None => {
                unsafe { function.delete() };
                return None;
            }
        };

        // A body that can fall off the end returns the zero of the declared
        // return type.
        if flow == Flow::Continues {
            let zero = self.zero_value(ret);
            self.builder.build_return(Some(&zero)).expect("build return");
        }

        // A well-formed front end must not produce ill-formed IR.
        if !function.verify(true) {
            errors::fatal(
                Phase::Codegen,
                format!("internal error: function '{name}' failed IR verification"),
            );
        }

        self.fpm.run_on(&function);
        Some(function)
    }
}

fn set_value_name(value: BasicValueEnum<'_>, name: &str) {
    match value {
        BasicValueEnum::IntValue(v) => v.set_name(name),
        BasicValueEnum::FloatValue(v) => v.set_name(name),
        BasicValueEnum::PointerValue(v) => v.set_name(name),
        _ => {}
    }
}
