//! IR Builder
//!
//! Keeps an insertion point so that instructions can be created without
//! naming their block each time.

use irf_common::{AddressSpace, Linkage, ThreadLocalMode};

use crate::blocks::BasicBlock;
use crate::constants::{ConstantDataArray, ConstantExpr, ConstantInt};
use crate::context::Context;
use crate::handle::ValueRef;
use crate::instructions::{BranchInst, CallInst, ReturnInst};
use crate::module::{GlobalVariable, Module};
use crate::types::Type;
use crate::values::Constant;

/// Builder for constructing IR
#[derive(Debug, Default)]
pub struct IrBuilder {
    insert_block: Option<BasicBlock>,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self { insert_block: None }
    }

    pub fn position_at_end(&mut self, block: BasicBlock) {
        self.insert_block = Some(block);
    }

    pub fn clear_insertion_point(&mut self) {
        self.insert_block = None;
    }

    pub fn insert_block(&self) -> Option<BasicBlock> {
        self.insert_block
    }

    fn block(&self) -> BasicBlock {
        match self.insert_block {
            Some(block) => block,
            None => panic!("IrBuilder has no insertion point"),
        }
    }

    pub fn create_call(
        &mut self,
        ctx: &mut Context,
        callee: impl Into<ValueRef>,
        args: &[ValueRef],
        name: &str,
    ) -> CallInst {
        CallInst::create(ctx, callee, args, name, self.block())
    }

    pub fn create_ret(&mut self, ctx: &mut Context, value: impl Into<ValueRef>) -> ReturnInst {
        ReturnInst::create(ctx, Some(value.into()), self.block())
    }

    pub fn create_ret_void(&mut self, ctx: &mut Context) -> ReturnInst {
        ReturnInst::create(ctx, None, self.block())
    }

    pub fn create_br(&mut self, ctx: &mut Context, dest: BasicBlock) -> BranchInst {
        BranchInst::create(ctx, dest, self.block())
    }

    pub fn create_cond_br(
        &mut self,
        ctx: &mut Context,
        cond: impl Into<ValueRef>,
        if_true: BasicBlock,
        if_false: BasicBlock,
    ) -> BranchInst {
        BranchInst::create_cond(ctx, if_true, if_false, cond.into(), self.block())
    }

    /// Emit `text` as a private NUL terminated global of `module` and return
    /// an `i8*` to its first byte.
    pub fn create_global_string_ptr(
        &mut self,
        ctx: &mut Context,
        module: Module,
        text: &str,
        name: &str,
    ) -> Constant {
        let init = ConstantDataArray::get_string(ctx, text, true);
        let ty = init.get_type(ctx);
        let global = GlobalVariable::new(
            ctx,
            module,
            ty,
            true,
            Linkage::Private,
            Some(init),
            name,
            None,
            ThreadLocalMode::NotThreadLocal,
            AddressSpace::Generic,
            false,
        );

        let i32_ty = Type::get_int32_ty(ctx);
        let zero: Constant = ConstantInt::get_signed(ctx, i32_ty, 0).into();
        ConstantExpr::get_get_element_ptr(ctx, global.into(), &[zero, zero], true)
    }
}
