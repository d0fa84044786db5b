//! Structural checks over built IR
//!
//! Construction already rejects most malformed input. The verifier covers
//! what can only be judged once a function is complete: unterminated
//! blocks, branches leaving the function, returns built in detached blocks,
//! operands owned by another function or module, and declaration linkage.

use log::debug;

use irf_common::IrError;

use crate::context::Context;
use crate::function::Function;
use crate::instructions::InstOp;
use crate::module::Module;
use crate::values::scope_violation;

pub fn verify_function(ctx: &Context, function: Function) -> Result<(), IrError> {
    let name = function.name(ctx).unwrap_or("").to_string();
    let fail = |message: String| Err(IrError::verify(name.clone(), message));

    if function.is_declaration(ctx) {
        if !function.linkage(ctx).is_valid_declaration_linkage() {
            return fail(format!(
                "declaration has invalid linkage '{}'",
                function.linkage(ctx).keyword()
            ));
        }
        return Ok(());
    }

    let blocks = function.basic_blocks(ctx);
    let module = function.parent(ctx);
    let expected_ret = function.function_type(ctx).return_type(ctx);

    for block in blocks {
        let label = block.name(ctx).unwrap_or("<unnamed>");
        let instructions = block.instructions(ctx);
        if instructions.is_empty() {
            return fail(format!("block '{label}' is empty"));
        }
        if block.terminator(ctx).is_none() {
            return fail(format!("block '{label}' does not end in a terminator"));
        }

        for inst in &instructions {
            for operand in inst.op(ctx).operands() {
                if let Some(reason) = scope_violation(ctx, operand, module, Some(function), true) {
                    return fail(format!("in block '{label}': {reason}"));
                }
            }
            match inst.op(ctx) {
                InstOp::Ret(value) => {
                    let ret_ty = value.map(|v| v.get_type(ctx));
                    let matches = match ret_ty {
                        None => expected_ret.is_void(ctx),
                        Some(ty) => ty == expected_ret,
                    };
                    if !matches {
                        return fail(format!(
                            "return in block '{label}' does not match return type {}",
                            expected_ret.display(ctx)
                        ));
                    }
                }
                InstOp::Br(dest) => {
                    if dest.parent(ctx) != Some(function) {
                        return fail(format!("branch in block '{label}' leaves the function"));
                    }
                }
                InstOp::CondBr { if_true, if_false, .. } => {
                    if if_true.parent(ctx) != Some(function) || if_false.parent(ctx) != Some(function) {
                        return fail(format!("branch in block '{label}' leaves the function"));
                    }
                }
                InstOp::Call { .. } => {}
            }
        }
    }

    debug!("verified function '{name}' ({} blocks)", blocks.len());
    Ok(())
}

pub fn verify_module(ctx: &Context, module: Module) -> Result<(), IrError> {
    for global in module.globals(ctx) {
        if global.is_declaration(ctx) && !global.linkage(ctx).is_valid_declaration_linkage() {
            return Err(IrError::verify(
                global.name(ctx).unwrap_or(""),
                format!("global declaration has invalid linkage '{}'", global.linkage(ctx).keyword()),
            ));
        }
        if let Some(init) = global.initializer(ctx) {
            if let Some(reason) = scope_violation(ctx, init.as_value(), module, None, true) {
                return Err(IrError::verify(global.name(ctx).unwrap_or(""), reason));
            }
        }
    }
    for function in module.functions(ctx) {
        verify_function(ctx, *function)?;
    }
    Ok(())
}
