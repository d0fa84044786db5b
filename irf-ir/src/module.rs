//! Module and Global Variables
//!
//! A module is bound to one context for its whole lifetime and owns the
//! functions and global variables created against it. Creating a global or
//! a function registers it in its module; there is no separate add step.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use irf_common::{AddressSpace, Linkage, ThreadLocalMode};

use crate::context::Context;
use crate::function::Function;
use crate::handle::{ContextId, TypeRef};
use crate::printer;
use crate::symbols::{Symbol, SymbolTable};
use crate::types::PointerType;
use crate::values::{rebind, scope_violation, Constant, ValueData, ValueKind};

/// Handle to a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    pub(crate) ctx: ContextId,
    pub(crate) index: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct ModuleData {
    pub(crate) name: String,
    pub(crate) globals: Vec<GlobalVariable>,
    pub(crate) functions: Vec<Function>,
    pub(crate) symbols: SymbolTable,
}

impl Module {
    pub fn new(ctx: &mut Context, module_id: &str) -> Module {
        debug!("creating module '{module_id}'");
        ctx.alloc_module(ModuleData {
            name: module_id.to_string(),
            globals: Vec::new(),
            functions: Vec::new(),
            symbols: SymbolTable::global(),
        })
    }

    /// The context this module was created in
    pub fn get_context(self) -> ContextId {
        self.ctx
    }

    pub fn name(self, ctx: &Context) -> &str {
        &ctx.module_data(self).name
    }

    pub fn globals(self, ctx: &Context) -> &[GlobalVariable] {
        &ctx.module_data(self).globals
    }

    pub fn functions(self, ctx: &Context) -> &[Function] {
        &ctx.module_data(self).functions
    }

    pub fn get_function(self, ctx: &Context, name: &str) -> Option<Function> {
        match ctx.module_data(self).symbols.lookup(name)? {
            Symbol::Value(value) => Function::dyn_cast(ctx, value),
            Symbol::Block(_) => None,
        }
    }

    pub fn get_global_variable(self, ctx: &Context, name: &str) -> Option<GlobalVariable> {
        match ctx.module_data(self).symbols.lookup(name)? {
            Symbol::Value(value) => GlobalVariable::dyn_cast(ctx, value),
            Symbol::Block(_) => None,
        }
    }

    /// Destroy this module and everything it owns. Other modules of the same
    /// context, and the context's types and scalar constants, are untouched.
    pub fn erase(self, ctx: &mut Context) {
        let data = ctx.take_module(self);
        debug!(
            "erasing module '{}' ({} functions, {} globals)",
            data.name,
            data.functions.len(),
            data.globals.len()
        );

        for function in &data.functions {
            let (args, blocks) = match &ctx.value_data(function.0).kind {
                ValueKind::Function(f) => (f.args.clone(), f.blocks.clone()),
                _ => unreachable!("module function list holds a non-function"),
            };
            for block in blocks {
                let instructions = ctx.block_data(block).instructions.clone();
                for inst in instructions {
                    ctx.erase_value(inst);
                }
                ctx.erase_block(block);
            }
            for arg in args {
                ctx.erase_value(arg.0);
            }
            ctx.erase_value(function.0);
        }
        for global in &data.globals {
            ctx.erase_value(global.0);
        }
        ctx.purge_dead_constants();
    }

    pub fn display(self, ctx: &Context) -> ModuleDisplay<'_> {
        ModuleDisplay { ctx, module: self }
    }
}

/// Textual IR of a whole module
pub struct ModuleDisplay<'a> {
    ctx: &'a Context,
    module: Module,
}

impl fmt::Display for ModuleDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        printer::write_module(f, self.ctx, self.module)
    }
}

/// Arena payload of a global variable
#[derive(Debug, Clone)]
pub struct GlobalData {
    pub(crate) module: Module,
    pub(crate) value_type: TypeRef,
    pub(crate) is_constant: bool,
    pub(crate) linkage: Linkage,
    pub(crate) initializer: Option<Constant>,
    pub(crate) thread_local_mode: ThreadLocalMode,
    pub(crate) address_space: AddressSpace,
    pub(crate) externally_initialized: bool,
}

value_subtype!(
    /// Module level variable. Its value is a pointer to the storage.
    GlobalVariable: Constant;
    ValueKind::GlobalVariable(_)
);

impl GlobalVariable {
    /// Create a global in `m`. Without `initializer` it is a declaration.
    /// `insert_before` places it ahead of an existing global of the same
    /// module; `None` appends.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &mut Context,
        m: Module,
        ty: TypeRef,
        is_constant: bool,
        linkage: Linkage,
        initializer: Option<Constant>,
        name: &str,
        insert_before: Option<GlobalVariable>,
        tl_mode: ThreadLocalMode,
        address_space: AddressSpace,
        is_externally_initialized: bool,
    ) -> GlobalVariable {
        if let Some(init) = initializer {
            let init_ty = init.get_type(ctx);
            if init_ty != ty {
                panic!(
                    "initializer of type {} does not match global type {}",
                    init_ty.display(ctx),
                    ty.display(ctx)
                );
            }
            if let Some(reason) = scope_violation(ctx, init.as_value(), m, None, true) {
                panic!("initializer of global '{name}': {reason}");
            }
        }

        let position = match insert_before {
            Some(before) => match ctx.module_data(m).globals.iter().position(|g| *g == before) {
                Some(position) => position,
                None => panic!("insert_before global does not belong to module '{}'", m.name(ctx)),
            },
            None => ctx.module_data(m).globals.len(),
        };

        let ptr_ty = PointerType::get(ctx, ty, address_space).as_type();
        let value = ctx.alloc_value(ValueData::new(
            ptr_ty,
            ValueKind::GlobalVariable(GlobalData {
                module: m,
                value_type: ty,
                is_constant,
                linkage,
                initializer,
                thread_local_mode: tl_mode,
                address_space,
                externally_initialized: is_externally_initialized,
            }),
        ));
        let global = GlobalVariable(value);

        ctx.module_data_mut(m).globals.insert(position, global);
        let bound = rebind(&mut ctx.module_data_mut(m).symbols, None, name, Symbol::Value(value));
        ctx.value_data_mut(value).name = bound;
        debug!("created global '{name}' in module '{}'", m.name(ctx));
        global
    }

    fn data(self, ctx: &Context) -> &GlobalData {
        match &ctx.value_data(self.0).kind {
            ValueKind::GlobalVariable(data) => data,
            _ => unreachable!("GlobalVariable handle without global payload"),
        }
    }

    fn data_mut(self, ctx: &mut Context) -> &mut GlobalData {
        match &mut ctx.value_data_mut(self.0).kind {
            ValueKind::GlobalVariable(data) => data,
            _ => unreachable!("GlobalVariable handle without global payload"),
        }
    }

    pub fn parent(self, ctx: &Context) -> Module {
        self.data(ctx).module
    }

    /// Type of the stored value (the global itself is a pointer to it)
    pub fn value_type(self, ctx: &Context) -> TypeRef {
        self.data(ctx).value_type
    }

    pub fn is_constant(self, ctx: &Context) -> bool {
        self.data(ctx).is_constant
    }

    pub fn linkage(self, ctx: &Context) -> Linkage {
        self.data(ctx).linkage
    }

    pub fn set_linkage(self, ctx: &mut Context, linkage: Linkage) {
        self.data_mut(ctx).linkage = linkage;
    }

    pub fn initializer(self, ctx: &Context) -> Option<Constant> {
        self.data(ctx).initializer
    }

    /// Replace the initializer. `None` turns the global into a declaration.
    pub fn set_initializer(self, ctx: &mut Context, initializer: Option<Constant>) {
        if let Some(init) = initializer {
            let expected = self.value_type(ctx);
            let init_ty = init.get_type(ctx);
            assert!(
                init_ty == expected,
                "initializer of type {} does not match global type {}",
                init_ty.display(ctx),
                expected.display(ctx)
            );
            if let Some(reason) = scope_violation(ctx, init.as_value(), self.parent(ctx), None, true) {
                panic!("initializer of global '{}': {reason}", self.name(ctx).unwrap_or(""));
            }
        }
        self.data_mut(ctx).initializer = initializer;
    }

    pub fn is_declaration(self, ctx: &Context) -> bool {
        self.data(ctx).initializer.is_none()
    }

    pub fn thread_local_mode(self, ctx: &Context) -> ThreadLocalMode {
        self.data(ctx).thread_local_mode
    }

    pub fn address_space(self, ctx: &Context) -> AddressSpace {
        self.data(ctx).address_space
    }

    pub fn is_externally_initialized(self, ctx: &Context) -> bool {
        self.data(ctx).externally_initialized
    }

    pub fn name(self, ctx: &Context) -> Option<&str> {
        self.0.name(ctx)
    }
}
