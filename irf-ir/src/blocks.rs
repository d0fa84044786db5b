//! Basic Block Management
//!
//! A basic block is an ordered list of instructions that belongs to at most
//! one function. It is not a value; branches refer to it directly.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::function::Function;
use crate::handle::{ContextId, ValueRef};
use crate::instructions::Instruction;
use crate::symbols::Symbol;
use crate::values::{rebind, scope_violation, ValueKind};

/// Handle to a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicBlock {
    pub(crate) ctx: ContextId,
    pub(crate) index: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct BlockData {
    pub(crate) name: Option<String>,
    pub(crate) parent: Option<Function>,
    pub(crate) instructions: Vec<ValueRef>,
    pub(crate) erased: bool,
}

impl BasicBlock {
    /// Create a block named `name`. With a `parent` the block is inserted
    /// into it, before `insert_before` when given, else at the end.
    /// Without a parent the block is detached until `insert_into`.
    pub fn create(
        ctx: &mut Context,
        name: &str,
        parent: Option<Function>,
        insert_before: Option<BasicBlock>,
    ) -> BasicBlock {
        let block = ctx.alloc_block(BlockData {
            name: (!name.is_empty()).then(|| name.to_string()),
            parent: None,
            instructions: Vec::new(),
            erased: false,
        });

        match parent {
            Some(function) => block.insert_into(ctx, function, insert_before),
            None => assert!(
                insert_before.is_none(),
                "insert_before given for a block without parent"
            ),
        }
        block
    }

    /// Insert a detached block into `function`. Its instructions may only use
    /// values of `function` and of its module.
    pub fn insert_into(self, ctx: &mut Context, function: Function, insert_before: Option<BasicBlock>) {
        if let Some(existing) = ctx.block_data(self).parent {
            panic!("block already belongs to function '{}'", existing.name(ctx).unwrap_or(""));
        }

        let position = match insert_before {
            Some(before) => match function.basic_blocks(ctx).iter().position(|b| *b == before) {
                Some(position) => position,
                None => panic!(
                    "insert_before block does not belong to function '{}'",
                    function.name(ctx).unwrap_or("")
                ),
            },
            None => function.basic_blocks(ctx).len(),
        };

        let operands: Vec<ValueRef> = self
            .instructions(ctx)
            .iter()
            .flat_map(|inst| inst.op(ctx).operands())
            .collect();
        let module = function.parent(ctx);
        for operand in operands {
            if let Some(reason) = scope_violation(ctx, operand, module, Some(function), false) {
                panic!(
                    "cannot insert block into function '{}': {reason}",
                    function.name(ctx).unwrap_or("")
                );
            }
        }

        function.data_mut(ctx).blocks.insert(position, self);
        ctx.block_data_mut(self).parent = Some(function);

        // Names chosen while detached are now uniqued in the function
        let old = ctx.block_data_mut(self).name.take();
        if let Some(name) = old {
            let bound = rebind(function.symbols_mut(ctx), None, &name, Symbol::Block(self));
            ctx.block_data_mut(self).name = bound;
        }
        let instructions = ctx.block_data(self).instructions.clone();
        for inst in instructions {
            let old = ctx.value_data_mut(inst).name.take();
            if let Some(name) = old {
                let bound = rebind(function.symbols_mut(ctx), None, &name, Symbol::Value(inst));
                ctx.value_data_mut(inst).name = bound;
            }
        }

        debug!(
            "inserted block '{}' into function '{}' at position {position}",
            self.name(ctx).unwrap_or(""),
            function.name(ctx).unwrap_or("")
        );
    }

    pub fn name(self, ctx: &Context) -> Option<&str> {
        ctx.block_data(self).name.as_deref()
    }

    pub fn set_name(self, ctx: &mut Context, name: &str) {
        let old = ctx.block_data_mut(self).name.take();
        let parent = ctx.block_data(self).parent;
        let new = match parent {
            Some(function) => rebind(function.symbols_mut(ctx), old.as_deref(), name, Symbol::Block(self)),
            None => (!name.is_empty()).then(|| name.to_string()),
        };
        ctx.block_data_mut(self).name = new;
    }

    pub fn parent(self, ctx: &Context) -> Option<Function> {
        ctx.block_data(self).parent
    }

    pub fn instructions(self, ctx: &Context) -> Vec<Instruction> {
        ctx.block_data(self)
            .instructions
            .iter()
            .map(|v| Instruction(*v))
            .collect()
    }

    pub fn is_empty(self, ctx: &Context) -> bool {
        ctx.block_data(self).instructions.is_empty()
    }

    /// The last instruction if it is a terminator
    pub fn terminator(self, ctx: &Context) -> Option<Instruction> {
        let last = *ctx.block_data(self).instructions.last()?;
        match &ctx.value_data(last).kind {
            ValueKind::Instruction(inst) if inst.op.is_terminator() => Some(Instruction(last)),
            _ => None,
        }
    }

    pub fn context_id(self) -> ContextId {
        self.ctx
    }
}
