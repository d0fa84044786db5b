//! IR Instructions
//!
//! Instructions are appended to a basic block when they are created and take
//! all their operands up front. A block accepts no instruction after its
//! terminator.

use serde::{Deserialize, Serialize};

use irf_common::CallingConv;

use crate::blocks::BasicBlock;
use crate::context::Context;
use crate::function::Function;
use crate::handle::{TypeRef, ValueRef};
use crate::types::{FunctionType, PointerType, Type, TypeKind};
use crate::values::{scope_violation, ValueData, ValueKind};

/// Arena payload of an instruction
#[derive(Debug, Clone)]
pub struct InstructionData {
    pub(crate) parent: BasicBlock,
    pub(crate) op: InstOp,
}

/// Operation and operands of an instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstOp {
    Call {
        callee: ValueRef,
        args: Vec<ValueRef>,
        calling_conv: CallingConv,
    },

    /// ret value or ret void
    Ret(Option<ValueRef>),

    Br(BasicBlock),

    CondBr {
        cond: ValueRef,
        if_true: BasicBlock,
        if_false: BasicBlock,
    },
}

impl InstOp {
    pub fn is_terminator(&self) -> bool {
        matches!(self, InstOp::Ret(_) | InstOp::Br(_) | InstOp::CondBr { .. })
    }

    pub fn opcode_name(&self) -> &'static str {
        match self {
            InstOp::Call { .. } => "call",
            InstOp::Ret(_) => "ret",
            InstOp::Br(_) | InstOp::CondBr { .. } => "br",
        }
    }

    /// Value operands in order. Block targets are not values.
    pub fn operands(&self) -> Vec<ValueRef> {
        match self {
            InstOp::Call { callee, args, .. } => {
                let mut operands = args.clone();
                operands.push(*callee);
                operands
            }
            InstOp::Ret(value) => value.iter().copied().collect(),
            InstOp::Br(_) => Vec::new(),
            InstOp::CondBr { cond, .. } => vec![*cond],
        }
    }
}

value_subtype!(
    /// Any instruction
    Instruction;
    ValueKind::Instruction(_)
);

value_subtype!(
    /// Direct or indirect call
    CallInst: Instruction;
    ValueKind::Instruction(InstructionData { op: InstOp::Call { .. }, .. })
);

value_subtype!(
    /// Return from the enclosing function
    ReturnInst: Instruction;
    ValueKind::Instruction(InstructionData { op: InstOp::Ret(_), .. })
);

value_subtype!(
    /// Unconditional or conditional branch
    BranchInst: Instruction;
    ValueKind::Instruction(InstructionData { op: InstOp::Br(_) | InstOp::CondBr { .. }, .. })
);

impl Instruction {
    fn data(self, ctx: &Context) -> &InstructionData {
        match &ctx.value_data(self.0).kind {
            ValueKind::Instruction(data) => data,
            _ => unreachable!("Instruction handle without instruction payload"),
        }
    }

    pub fn parent(self, ctx: &Context) -> BasicBlock {
        self.data(ctx).parent
    }

    pub fn op(self, ctx: &Context) -> &InstOp {
        &self.data(ctx).op
    }

    pub fn is_terminator(self, ctx: &Context) -> bool {
        self.op(ctx).is_terminator()
    }

    pub fn get_type(self, ctx: &Context) -> TypeRef {
        self.0.get_type(ctx)
    }
}

/// Append a new instruction at the end of `block`.
fn append(ctx: &mut Context, block: BasicBlock, ty: TypeRef, op: InstOp, name: &str) -> ValueRef {
    if let Some(terminator) = block.terminator(ctx) {
        panic!(
            "cannot append '{}' to block '{}' after its terminator '{}'",
            op.opcode_name(),
            block.name(ctx).unwrap_or(""),
            terminator.op(ctx).opcode_name()
        );
    }

    let value = ctx.alloc_value(ValueData::new(
        ty,
        ValueKind::Instruction(InstructionData { parent: block, op }),
    ));
    ctx.block_data_mut(block).instructions.push(value);
    if !name.is_empty() {
        value.set_name(ctx, name);
    }
    value
}

/// Reject operands that belong to another function or module of a placed
/// block. Detached blocks are checked when inserted and by the verifier.
pub(crate) fn check_operand_scope(ctx: &Context, block: BasicBlock, operands: &[ValueRef]) {
    let Some(function) = block.parent(ctx) else {
        return;
    };
    let module = function.parent(ctx);
    for operand in operands {
        if let Some(reason) = scope_violation(ctx, *operand, module, Some(function), false) {
            panic!("{reason}");
        }
    }
}

/// Signature of a callee, which must be a pointer to a function type
pub(crate) fn callee_signature(ctx: &Context, callee: ValueRef) -> Option<FunctionType> {
    let ptr = PointerType::dyn_cast(ctx, callee.get_type(ctx))?;
    FunctionType::dyn_cast(ctx, ptr.element_type(ctx))
}

impl CallInst {
    /// Call `func` with `args` at the end of `insert_at_end`.
    ///
    /// The argument count must match the signature (or exceed it for a
    /// variadic callee) and each fixed argument must have its parameter's
    /// type. A callee defined in another module is rejected, as are
    /// arguments owned by another function or module.
    pub fn create(
        ctx: &mut Context,
        func: impl Into<ValueRef>,
        args: &[ValueRef],
        name_str: &str,
        insert_at_end: BasicBlock,
    ) -> CallInst {
        let callee = func.into();
        let fn_ty = match callee_signature(ctx, callee) {
            Some(fn_ty) => fn_ty,
            None => panic!(
                "called value of type {} is not a function pointer",
                callee.get_type(ctx).display(ctx)
            ),
        };

        let params = fn_ty.params(ctx).to_vec();
        let is_var_arg = fn_ty.is_var_arg(ctx);
        let count_ok = if is_var_arg {
            args.len() >= params.len()
        } else {
            args.len() == params.len()
        };
        if !count_ok {
            panic!(
                "call to {} expects {} arguments, got {}",
                fn_ty.as_type().display(ctx),
                params.len(),
                args.len()
            );
        }
        for (position, arg) in args.iter().enumerate() {
            let arg_ty = arg.get_type(ctx);
            match params.get(position) {
                Some(param_ty) if *param_ty != arg_ty => panic!(
                    "call argument {position} has type {}, parameter expects {}",
                    arg_ty.display(ctx),
                    param_ty.display(ctx)
                ),
                None if !arg_ty.is_first_class(ctx) => panic!(
                    "variadic call argument {position} has invalid type {}",
                    arg_ty.display(ctx)
                ),
                _ => {}
            }
        }

        if let (Some(target), Some(caller)) = (Function::dyn_cast(ctx, callee), insert_at_end.parent(ctx)) {
            if target.parent(ctx) != caller.parent(ctx) {
                panic!(
                    "call from module '{}' to function '{}' of module '{}'",
                    caller.parent(ctx).name(ctx),
                    target.name(ctx).unwrap_or(""),
                    target.parent(ctx).name(ctx)
                );
            }
        }

        check_operand_scope(ctx, insert_at_end, args);

        let ret = fn_ty.return_type(ctx);
        let op = InstOp::Call {
            callee,
            args: args.to_vec(),
            calling_conv: CallingConv::C,
        };
        CallInst(append(ctx, insert_at_end, ret, op, name_str))
    }

    fn op_mut(self, ctx: &mut Context) -> &mut InstOp {
        match &mut ctx.value_data_mut(self.0).kind {
            ValueKind::Instruction(data) => &mut data.op,
            _ => unreachable!("CallInst handle without instruction payload"),
        }
    }

    pub fn called_value(self, ctx: &Context) -> ValueRef {
        match Instruction(self.0).op(ctx) {
            InstOp::Call { callee, .. } => *callee,
            _ => unreachable!("CallInst handle without call payload"),
        }
    }

    pub fn args(self, ctx: &Context) -> &[ValueRef] {
        match Instruction(self.0).op(ctx) {
            InstOp::Call { args, .. } => args,
            _ => unreachable!("CallInst handle without call payload"),
        }
    }

    pub fn function_type(self, ctx: &Context) -> FunctionType {
        match callee_signature(ctx, self.called_value(ctx)) {
            Some(fn_ty) => fn_ty,
            None => unreachable!("call through a non-function pointer"),
        }
    }

    pub fn calling_conv(self, ctx: &Context) -> CallingConv {
        match Instruction(self.0).op(ctx) {
            InstOp::Call { calling_conv, .. } => *calling_conv,
            _ => unreachable!("CallInst handle without call payload"),
        }
    }

    /// Calling convention of the call site; should match the callee's
    pub fn set_calling_conv(self, ctx: &mut Context, cc: CallingConv) {
        if let InstOp::Call { calling_conv, .. } = self.op_mut(ctx) {
            *calling_conv = cc;
        }
    }
}

impl ReturnInst {
    /// Return `ret_val` (or void) at the end of `insert_at_end`. When the
    /// block already has a parent, the value must match its return type.
    pub fn create(ctx: &mut Context, ret_val: Option<ValueRef>, insert_at_end: BasicBlock) -> ReturnInst {
        if let Some(function) = insert_at_end.parent(ctx) {
            let expected = function.function_type(ctx).return_type(ctx);
            match ret_val {
                None if !expected.is_void(ctx) => panic!(
                    "ret void in function '{}' returning {}",
                    function.name(ctx).unwrap_or(""),
                    expected.display(ctx)
                ),
                Some(value) if value.get_type(ctx) != expected => panic!(
                    "ret of type {} in function '{}' returning {}",
                    value.get_type(ctx).display(ctx),
                    function.name(ctx).unwrap_or(""),
                    expected.display(ctx)
                ),
                _ => {}
            }
        }
        if let Some(value) = ret_val {
            check_operand_scope(ctx, insert_at_end, &[value]);
        }

        let void_ty = Type::get_void_ty(ctx);
        ReturnInst(append(ctx, insert_at_end, void_ty, InstOp::Ret(ret_val), ""))
    }

    pub fn return_value(self, ctx: &Context) -> Option<ValueRef> {
        match Instruction(self.0).op(ctx) {
            InstOp::Ret(value) => *value,
            _ => unreachable!("ReturnInst handle without ret payload"),
        }
    }
}

impl BranchInst {
    /// Unconditional branch to `if_true`
    pub fn create(ctx: &mut Context, if_true: BasicBlock, insert_at_end: BasicBlock) -> BranchInst {
        let void_ty = Type::get_void_ty(ctx);
        BranchInst(append(ctx, insert_at_end, void_ty, InstOp::Br(if_true), ""))
    }

    /// Branch to `if_true` when `cond` (an i1) holds, else to `if_false`
    pub fn create_cond(
        ctx: &mut Context,
        if_true: BasicBlock,
        if_false: BasicBlock,
        cond: ValueRef,
        insert_at_end: BasicBlock,
    ) -> BranchInst {
        let cond_ty = cond.get_type(ctx);
        if !matches!(ctx.type_kind(cond_ty), TypeKind::Integer { bits: 1 }) {
            panic!("branch condition must be i1, got {}", cond_ty.display(ctx));
        }
        check_operand_scope(ctx, insert_at_end, &[cond]);
        let void_ty = Type::get_void_ty(ctx);
        let op = InstOp::CondBr { cond, if_true, if_false };
        BranchInst(append(ctx, insert_at_end, void_ty, op, ""))
    }

    pub fn successors(self, ctx: &Context) -> Vec<BasicBlock> {
        match Instruction(self.0).op(ctx) {
            InstOp::Br(dest) => vec![*dest],
            InstOp::CondBr { if_true, if_false, .. } => vec![*if_true, *if_false],
            _ => unreachable!("BranchInst handle without branch payload"),
        }
    }
}
