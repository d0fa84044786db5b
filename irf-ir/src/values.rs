//! IR Value Representations
//!
//! Everything usable as an operand is a value: constants, globals,
//! functions, arguments and instructions. The hierarchy is a closed sum
//! (`ValueKind`); the typed handles (`Constant`, `ConstantInt`,
//! `GlobalVariable`, `Function`, `CallInst`, ...) are views selected by the
//! variant tag.

use std::fmt;

use crate::apint::ApInt;
use crate::context::Context;
use crate::function::{ArgumentData, Function, FunctionData};
use crate::handle::{TypeRef, ValueRef};
use crate::instructions::InstructionData;
use crate::module::{GlobalData, Module};
use crate::printer;
use crate::symbols::{Symbol, SymbolTable};

/// Arena record for one value
#[derive(Debug, Clone)]
pub(crate) struct ValueData {
    pub(crate) ty: TypeRef,
    pub(crate) name: Option<String>,
    pub(crate) kind: ValueKind,
}

impl ValueData {
    pub(crate) fn new(ty: TypeRef, kind: ValueKind) -> Self {
        Self { ty, name: None, kind }
    }
}

/// Variant tag of a value
#[derive(Debug, Clone)]
pub enum ValueKind {
    ConstantInt(ApInt),

    /// Constant byte array, element type i8
    ConstantDataArray(Vec<u8>),

    /// Constant pointer arithmetic over a base constant
    GetElementPtr {
        source_type: TypeRef,
        base: ValueRef,
        indices: Vec<ValueRef>,
        in_bounds: bool,
    },

    GlobalVariable(GlobalData),

    Function(FunctionData),

    Argument(ArgumentData),

    Instruction(InstructionData),

    /// Tombstone left behind when the owning module is erased
    Erased,
}

impl ValueKind {
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            ValueKind::ConstantInt(_)
                | ValueKind::ConstantDataArray(_)
                | ValueKind::GetElementPtr { .. }
                | ValueKind::GlobalVariable(_)
                | ValueKind::Function(_)
        )
    }
}

value_subtype!(
    /// A value fixed at construction
    Constant;
    ValueKind::ConstantInt(_)
        | ValueKind::ConstantDataArray(_)
        | ValueKind::GetElementPtr { .. }
        | ValueKind::GlobalVariable(_)
        | ValueKind::Function(_)
);

impl Constant {
    pub fn get_type(self, ctx: &Context) -> TypeRef {
        self.0.get_type(ctx)
    }
}

/// Symbol table a value's name lives in
enum NameScope {
    Module(Module),
    Function(Function),
    Detached,
}

impl ValueRef {
    pub fn get_type(self, ctx: &Context) -> TypeRef {
        ctx.value_data(self).ty
    }

    pub fn kind(self, ctx: &Context) -> &ValueKind {
        &ctx.value_data(self).kind
    }

    pub fn name(self, ctx: &Context) -> Option<&str> {
        ctx.value_data(self).name.as_deref()
    }

    pub fn has_name(self, ctx: &Context) -> bool {
        ctx.value_data(self).name.is_some()
    }

    pub fn is_constant(self, ctx: &Context) -> bool {
        ctx.value_data(self).kind.is_constant()
    }

    /// Rename this value. An empty name makes it anonymous. A name already
    /// taken in the enclosing symbol table gets a numeric suffix.
    pub fn set_name(self, ctx: &mut Context, name: &str) {
        let scope = {
            let data = ctx.value_data(self);
            match &data.kind {
                ValueKind::GlobalVariable(global) => NameScope::Module(global.module),
                ValueKind::Function(function) => NameScope::Module(function.module),
                ValueKind::Argument(arg) => NameScope::Function(arg.parent),
                ValueKind::Instruction(inst) => match ctx.block_data(inst.parent).parent {
                    Some(function) => NameScope::Function(function),
                    None => NameScope::Detached,
                },
                _ => panic!("constant values cannot be named"),
            }
        };

        if !name.is_empty() && self.get_type(ctx).is_void(ctx) {
            panic!("cannot assign name '{name}' to a void value");
        }

        let old = ctx.value_data_mut(self).name.take();
        let new = match scope {
            NameScope::Module(module) => {
                let symbols = &mut ctx.module_data_mut(module).symbols;
                rebind(symbols, old.as_deref(), name, Symbol::Value(self))
            }
            NameScope::Function(function) => {
                let symbols = function.symbols_mut(ctx);
                rebind(symbols, old.as_deref(), name, Symbol::Value(self))
            }
            NameScope::Detached => (!name.is_empty()).then(|| name.to_string()),
        };
        ctx.value_data_mut(self).name = new;
    }

    /// Print the textual form of this value to stderr
    pub fn dump(self, ctx: &Context) {
        eprintln!("{}", self.display(ctx));
    }

    pub fn display(self, ctx: &Context) -> ValueDisplay<'_> {
        ValueDisplay { ctx, value: self }
    }
}

/// Release `old` in `symbols` and bind `name` (uniqued) to `symbol`.
pub(crate) fn rebind(
    symbols: &mut SymbolTable,
    old: Option<&str>,
    name: &str,
    symbol: Symbol,
) -> Option<String> {
    if let Some(old) = old {
        symbols.remove(old);
    }
    if name.is_empty() {
        return None;
    }
    Some(symbols.insert_unique(name, symbol))
}

/// What keeps an operand alive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Uniqued context constant with no module ties
    Free,
    Module(Module),
    Function(Function),
    /// Instruction of a block not yet placed in a function
    DetachedBlock,
}

fn anchor(ctx: &Context, value: ValueRef) -> Anchor {
    match &ctx.value_data(value).kind {
        ValueKind::GlobalVariable(global) => Anchor::Module(global.module),
        ValueKind::Function(function) => Anchor::Module(function.module),
        ValueKind::GetElementPtr { base, .. } => anchor(ctx, *base),
        ValueKind::Argument(arg) => Anchor::Function(arg.parent),
        ValueKind::Instruction(inst) => match ctx.block_data(inst.parent).parent {
            Some(function) => Anchor::Function(function),
            None => Anchor::DetachedBlock,
        },
        _ => Anchor::Free,
    }
}

fn operand_label(ctx: &Context, value: ValueRef) -> String {
    match value.name(ctx) {
        Some(name) => format!("'{name}'"),
        None => format!("#{}", value.index),
    }
}

/// Why `operand` cannot be used in `module`, inside `function` when given.
/// Globals and functions (also behind a constant GEP) must belong to
/// `module`; arguments and instructions to `function`. Operands from
/// detached blocks are rejected only when `strict`.
pub(crate) fn scope_violation(
    ctx: &Context,
    operand: ValueRef,
    module: Module,
    function: Option<Function>,
    strict: bool,
) -> Option<String> {
    match anchor(ctx, operand) {
        Anchor::Free => None,
        Anchor::Module(owner) if owner == module => None,
        Anchor::Module(owner) => Some(format!(
            "operand {} refers to module '{}', used in module '{}'",
            operand_label(ctx, operand),
            owner.name(ctx),
            module.name(ctx)
        )),
        Anchor::Function(owner) if Some(owner) == function => None,
        Anchor::Function(owner) => Some(match function {
            Some(user) => format!(
                "operand {} of function '{}' used in function '{}'",
                operand_label(ctx, operand),
                owner.name(ctx).unwrap_or(""),
                user.name(ctx).unwrap_or("")
            ),
            None => format!(
                "operand {} of function '{}' used outside any function",
                operand_label(ctx, operand),
                owner.name(ctx).unwrap_or("")
            ),
        }),
        Anchor::DetachedBlock if strict => Some(format!(
            "operand {} is defined in a detached block",
            operand_label(ctx, operand)
        )),
        Anchor::DetachedBlock => None,
    }
}

/// Textual form of a value: the full definition for globals, functions and
/// instructions, `type operand` otherwise.
pub struct ValueDisplay<'a> {
    ctx: &'a Context,
    value: ValueRef,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        printer::write_value(f, self.ctx, self.value)
    }
}
