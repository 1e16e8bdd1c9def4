//! The JIT host: a registry of compiled modules addressable by handle.
//!
//! Each submitted module gets its own execution engine. Adding a module
//! transfers ownership to the host; removing a handle frees the module and
//! its machine code. `find_symbol` resolves a name across every live module,
//! newest first, so a redefinition wins.

use std::sync::Once;

use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;

use super::runtime;

/// Identifies a module owned by the JIT host.
pub type ModuleHandle = usize;

struct JitModule<'ctx> {
    module: Module<'ctx>,
    engine: ExecutionEngine<'ctx>,
}

pub struct Jit<'ctx> {
    /// Slot per handle; `None` marks a removed module.
    modules: Vec<Option<JitModule<'ctx>>>,
}

static NATIVE_TARGET: Once = Once::new();

impl<'ctx> Jit<'ctx> {
    pub fn new() -> Self {
        NATIVE_TARGET.call_once(|| {
            Target::initialize_native(&InitializationConfig::default())
                .expect("failed to initialise native target");
        });
        Self { modules: Vec::new() }
    }

    /// Take ownership of `module`, compile it, and return its handle.
    ///
    /// External declarations are wired up before any code runs: runtime
    /// helpers map to their host addresses, and functions that only exist as
    /// declarations here map to their definitions in earlier live modules.
    pub fn add_module(&mut self, module: Module<'ctx>) -> Result<ModuleHandle, String> {
        let engine = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|e| e.to_string())?;

        let mut next = module.get_first_function();
        while let Some(function) = next {
            if function.count_basic_blocks() == 0 {
                let name = function.get_name().to_str().unwrap_or_default().to_string();
                if let Some(addr) = runtime::host_symbol(&name).or_else(|| self.find_symbol(&name)) {
                    engine.add_global_mapping(&function, addr);
                }
            }
            next = function.get_next_function();
        }

        self.modules.push(Some(JitModule { module, engine }));
        Ok(self.modules.len() - 1)
    }

    /// Free a module and the code compiled from it.
    pub fn remove_module(&mut self, handle: ModuleHandle) {
        if let Some(slot) = self.modules.get_mut(handle) {
            *slot = None;
        }
    }

    /// Resolve `name` to the address of its compiled definition, searching
    /// live modules newest first.
    pub fn find_symbol(&self, name: &str) -> Option<usize> {
        for jit_module in self.modules.iter().rev().flatten() {
            let defined = jit_module
                .module
                .get_function(name)
                .map_or(false, |f| f.count_basic_blocks() > 0);
            if !defined {
                continue;
            }
            if let Ok(addr) = jit_module.engine.get_function_address(name) {
                return Some(addr);
            }
        }
        None
    }
}
