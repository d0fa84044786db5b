//! Function Definitions
//!
//! A function is created inside a module with a signature, a linkage and a
//! name. It starts as a declaration (no blocks) and becomes a definition as
//! blocks are created against it.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use irf_common::{CallingConv, Linkage};

use crate::blocks::BasicBlock;
use crate::context::Context;
use crate::module::Module;
use crate::printer;
use crate::symbols::{Symbol, SymbolTable};
use crate::types::{FunctionType, PointerType};
use crate::values::{rebind, Constant, ValueData, ValueKind};

/// Arena payload of a function
#[derive(Debug, Clone)]
pub struct FunctionData {
    pub(crate) module: Module,
    pub(crate) function_type: FunctionType,
    pub(crate) linkage: Linkage,
    pub(crate) calling_conv: CallingConv,
    pub(crate) args: Vec<Argument>,
    pub(crate) blocks: Vec<BasicBlock>,
    pub(crate) symbols: SymbolTable,
}

/// Arena payload of a formal argument
#[derive(Debug, Clone)]
pub struct ArgumentData {
    pub(crate) parent: Function,
    pub(crate) index: u32,
}

/// Construction state of a function body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FunctionState {
    /// No blocks
    Declared,
    /// At least one block lacks a terminator
    Defining,
    /// Every block ends in exactly one terminator
    WellFormed,
}

value_subtype!(
    /// A function. Its value is a pointer to its signature type.
    Function: Constant;
    ValueKind::Function(_)
);

value_subtype!(
    /// Formal argument of a function
    Argument;
    ValueKind::Argument(_)
);

impl Function {
    /// Allocate a function of signature `ty` and register it in `m`.
    pub fn create(ctx: &mut Context, ty: FunctionType, linkage: Linkage, n: &str, m: Module) -> Function {
        let ptr_ty = PointerType::get_unqual(ctx, ty.as_type()).as_type();
        let value = ctx.alloc_value(ValueData::new(
            ptr_ty,
            ValueKind::Function(FunctionData {
                module: m,
                function_type: ty,
                linkage,
                calling_conv: CallingConv::C,
                args: Vec::new(),
                blocks: Vec::new(),
                symbols: SymbolTable::local(),
            }),
        ));
        let function = Function(value);

        let param_types = ty.params(ctx).to_vec();
        let args: Vec<Argument> = param_types
            .into_iter()
            .enumerate()
            .map(|(index, param_ty)| {
                Argument(ctx.alloc_value(ValueData::new(
                    param_ty,
                    ValueKind::Argument(ArgumentData {
                        parent: function,
                        index: index as u32,
                    }),
                )))
            })
            .collect();
        function.data_mut(ctx).args = args;

        ctx.module_data_mut(m).functions.push(function);
        let bound = rebind(&mut ctx.module_data_mut(m).symbols, None, n, Symbol::Value(value));
        ctx.value_data_mut(value).name = bound;
        debug!("created function '{n}' in module '{}'", m.name(ctx));
        function
    }

    pub(crate) fn data(self, ctx: &Context) -> &FunctionData {
        match &ctx.value_data(self.0).kind {
            ValueKind::Function(data) => data,
            _ => unreachable!("Function handle without function payload"),
        }
    }

    pub(crate) fn data_mut(self, ctx: &mut Context) -> &mut FunctionData {
        match &mut ctx.value_data_mut(self.0).kind {
            ValueKind::Function(data) => data,
            _ => unreachable!("Function handle without function payload"),
        }
    }

    pub(crate) fn symbols_mut(self, ctx: &mut Context) -> &mut SymbolTable {
        &mut self.data_mut(ctx).symbols
    }

    pub fn parent(self, ctx: &Context) -> Module {
        self.data(ctx).module
    }

    pub fn name(self, ctx: &Context) -> Option<&str> {
        self.0.name(ctx)
    }

    pub fn function_type(self, ctx: &Context) -> FunctionType {
        self.data(ctx).function_type
    }

    pub fn linkage(self, ctx: &Context) -> Linkage {
        self.data(ctx).linkage
    }

    pub fn set_linkage(self, ctx: &mut Context, linkage: Linkage) {
        self.data_mut(ctx).linkage = linkage;
    }

    pub fn calling_conv(self, ctx: &Context) -> CallingConv {
        self.data(ctx).calling_conv
    }

    pub fn set_calling_conv(self, ctx: &mut Context, cc: CallingConv) {
        self.data_mut(ctx).calling_conv = cc;
    }

    pub fn args(self, ctx: &Context) -> &[Argument] {
        &self.data(ctx).args
    }

    pub fn arg(self, ctx: &Context, index: usize) -> Argument {
        let args = self.args(ctx);
        match args.get(index) {
            Some(arg) => *arg,
            None => panic!("argument index {index} out of range, function has {}", args.len()),
        }
    }

    pub fn basic_blocks(self, ctx: &Context) -> &[BasicBlock] {
        &self.data(ctx).blocks
    }

    pub fn entry_block(self, ctx: &Context) -> Option<BasicBlock> {
        self.data(ctx).blocks.first().copied()
    }

    pub fn is_declaration(self, ctx: &Context) -> bool {
        self.data(ctx).blocks.is_empty()
    }

    pub fn state(self, ctx: &Context) -> FunctionState {
        let blocks = &self.data(ctx).blocks;
        if blocks.is_empty() {
            FunctionState::Declared
        } else if blocks.iter().all(|b| b.terminator(ctx).is_some()) {
            FunctionState::WellFormed
        } else {
            FunctionState::Defining
        }
    }

    pub fn display(self, ctx: &Context) -> FunctionDisplay<'_> {
        FunctionDisplay { ctx, function: self }
    }
}

impl Argument {
    pub fn parent(self, ctx: &Context) -> Function {
        self.data(ctx).parent
    }

    pub fn arg_no(self, ctx: &Context) -> u32 {
        self.data(ctx).index
    }

    pub fn set_name(self, ctx: &mut Context, name: &str) {
        self.0.set_name(ctx, name);
    }

    fn data(self, ctx: &Context) -> &ArgumentData {
        match &ctx.value_data(self.0).kind {
            ValueKind::Argument(data) => data,
            _ => unreachable!("Argument handle without argument payload"),
        }
    }
}

/// Textual IR of a single function
pub struct FunctionDisplay<'a> {
    ctx: &'a Context,
    function: Function,
}

impl fmt::Display for FunctionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        printer::write_function(f, self.ctx, self.function)
    }
}
