//! Textual IR output
//!
//! Renders modules, functions and values in the standard assembly format:
//!
//! ```text
//! ; ModuleID = 'm'
//!
//! @.str = private constant [3 x i8] c"ab\00"
//!
//! define i32 @main() {
//! entry:
//!   ret i32 42
//! }
//! ```
//!
//! Unnamed globals and functions are numbered `@0, @1, ...` per module;
//! unnamed arguments, blocks and non-void instructions are numbered
//! `%0, %1, ...` per function in definition order.

use std::collections::HashMap;
use std::fmt;

use irf_common::{AddressSpace, CallingConv, Linkage};

use crate::blocks::BasicBlock;
use crate::context::Context;
use crate::function::Function;
use crate::handle::ValueRef;
use crate::instructions::{callee_signature, InstOp, Instruction};
use crate::module::{GlobalVariable, Module};
use crate::values::ValueKind;

#[derive(Default)]
struct LocalSlots {
    values: HashMap<ValueRef, u32>,
    blocks: HashMap<BasicBlock, u32>,
}

struct Printer<'a> {
    ctx: &'a Context,
    globals: HashMap<ValueRef, u32>,
    locals: LocalSlots,
}

impl<'a> Printer<'a> {
    fn new(ctx: &'a Context, module: Option<Module>) -> Self {
        let mut globals = HashMap::new();
        if let Some(module) = module {
            let mut next = 0;
            let all = module
                .globals(ctx)
                .iter()
                .map(|g| g.as_value())
                .chain(module.functions(ctx).iter().map(|f| f.as_value()));
            for value in all {
                if !value.has_name(ctx) {
                    globals.insert(value, next);
                    next += 1;
                }
            }
        }
        Self {
            ctx,
            globals,
            locals: LocalSlots::default(),
        }
    }

    fn enter_function(&mut self, function: Function) {
        let ctx = self.ctx;
        let mut locals = LocalSlots::default();
        let mut next = 0;
        for arg in function.args(ctx) {
            if !arg.as_value().has_name(ctx) {
                locals.values.insert(arg.as_value(), next);
                next += 1;
            }
        }
        for block in function.basic_blocks(ctx) {
            if block.name(ctx).is_none() {
                locals.blocks.insert(*block, next);
                next += 1;
            }
            for inst in block.instructions(ctx) {
                let value = inst.as_value();
                if !value.has_name(ctx) && !value.get_type(ctx).is_void(ctx) {
                    locals.values.insert(value, next);
                    next += 1;
                }
            }
        }
        self.locals = locals;
    }

    fn write_module(&mut self, f: &mut fmt::Formatter<'_>, module: Module) -> fmt::Result {
        let ctx = self.ctx;
        writeln!(f, "; ModuleID = '{}'", module.name(ctx))?;

        let globals = module.globals(ctx);
        if !globals.is_empty() {
            writeln!(f)?;
        }
        for global in globals {
            self.write_global(f, *global)?;
            writeln!(f)?;
        }

        for function in module.functions(ctx) {
            writeln!(f)?;
            self.write_function(f, *function)?;
        }
        Ok(())
    }

    fn write_global(&mut self, f: &mut fmt::Formatter<'_>, global: GlobalVariable) -> fmt::Result {
        let ctx = self.ctx;
        self.write_ref(f, global.as_value())?;
        write!(f, " = ")?;

        let linkage = global.linkage(ctx);
        if global.is_declaration(ctx) && linkage == Linkage::External {
            write!(f, "external ")?;
        }
        write_linkage(f, linkage)?;
        if let Some(tls) = global.thread_local_mode(ctx).keyword() {
            write!(f, "{tls} ")?;
        }
        let address_space = global.address_space(ctx);
        if address_space != AddressSpace::Generic {
            write!(f, "addrspace({}) ", address_space.code())?;
        }
        if global.is_externally_initialized(ctx) {
            write!(f, "externally_initialized ")?;
        }
        let keyword = if global.is_constant(ctx) { "constant" } else { "global" };
        write!(f, "{keyword} {}", global.value_type(ctx).display(ctx))?;

        if let Some(init) = global.initializer(ctx) {
            write!(f, " ")?;
            self.write_ref(f, init.as_value())?;
        }
        Ok(())
    }

    fn write_function(&mut self, f: &mut fmt::Formatter<'_>, function: Function) -> fmt::Result {
        let ctx = self.ctx;
        self.enter_function(function);

        let is_declaration = function.is_declaration(ctx);
        write!(f, "{} ", if is_declaration { "declare" } else { "define" })?;
        write_linkage(f, function.linkage(ctx))?;
        write_calling_conv(f, function.calling_conv(ctx))?;

        let fn_ty = function.function_type(ctx);
        write!(f, "{} ", fn_ty.return_type(ctx).display(ctx))?;
        self.write_ref(f, function.as_value())?;

        write!(f, "(")?;
        for (i, arg) in function.args(ctx).iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            if is_declaration {
                write!(f, "{}", arg.as_value().get_type(ctx).display(ctx))?;
            } else {
                self.write_operand(f, arg.as_value())?;
            }
        }
        if fn_ty.is_var_arg(ctx) {
            if fn_ty.num_params(ctx) > 0 { write!(f, ", ")?; }
            write!(f, "...")?;
        }
        write!(f, ")")?;

        if is_declaration {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        for (i, block) in function.basic_blocks(ctx).iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match block.name(ctx) {
                Some(name) => {
                    write_ident(f, name)?;
                    writeln!(f, ":")?;
                }
                None if i > 0 => {
                    let slot = self.locals.blocks.get(block).copied().unwrap_or_default();
                    writeln!(f, "; <label>:{slot}")?;
                }
                None => {}
            }
            for inst in block.instructions(ctx) {
                write!(f, "  ")?;
                self.write_instruction(f, inst)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "}}")
    }

    fn write_instruction(&mut self, f: &mut fmt::Formatter<'_>, inst: Instruction) -> fmt::Result {
        let ctx = self.ctx;
        let value = inst.as_value();
        let ty = value.get_type(ctx);
        if !ty.is_void(ctx) {
            self.write_ref(f, value)?;
            write!(f, " = ")?;
        }

        match inst.op(ctx) {
            InstOp::Call { callee, args, calling_conv } => {
                write!(f, "call ")?;
                write_calling_conv(f, *calling_conv)?;
                // Variadic callees are printed with their full pointer type
                match callee_signature(ctx, *callee) {
                    Some(fn_ty) if fn_ty.is_var_arg(ctx) => {
                        write!(f, "{} ", callee.get_type(ctx).display(ctx))?
                    }
                    _ => write!(f, "{} ", ty.display(ctx))?,
                }
                self.write_ref(f, *callee)?;
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    self.write_operand(f, *arg)?;
                }
                write!(f, ")")
            }
            InstOp::Ret(None) => write!(f, "ret void"),
            InstOp::Ret(Some(ret)) => {
                write!(f, "ret ")?;
                self.write_operand(f, *ret)
            }
            InstOp::Br(dest) => {
                write!(f, "br label ")?;
                self.write_block_ref(f, *dest)
            }
            InstOp::CondBr { cond, if_true, if_false } => {
                write!(f, "br ")?;
                self.write_operand(f, *cond)?;
                write!(f, ", label ")?;
                self.write_block_ref(f, *if_true)?;
                write!(f, ", label ")?;
                self.write_block_ref(f, *if_false)
            }
        }
    }

    /// `type ref`
    fn write_operand(&mut self, f: &mut fmt::Formatter<'_>, value: ValueRef) -> fmt::Result {
        write!(f, "{} ", value.get_type(self.ctx).display(self.ctx))?;
        self.write_ref(f, value)
    }

    /// Operand without its type: a literal, `@global` or `%local`
    fn write_ref(&mut self, f: &mut fmt::Formatter<'_>, value: ValueRef) -> fmt::Result {
        let ctx = self.ctx;
        match value.kind(ctx) {
            ValueKind::ConstantInt(v) => {
                if v.bit_width() == 1 {
                    write!(f, "{}", if v.is_zero() { "false" } else { "true" })
                } else {
                    write!(f, "{v}")
                }
            }
            ValueKind::ConstantDataArray(bytes) => {
                if bytes.iter().all(|&b| b == 0) {
                    write!(f, "zeroinitializer")
                } else {
                    write!(f, "c\"")?;
                    write_escaped(f, bytes)?;
                    write!(f, "\"")
                }
            }
            ValueKind::GetElementPtr { source_type, base, indices, in_bounds } => {
                write!(f, "getelementptr ")?;
                if *in_bounds {
                    write!(f, "inbounds ")?;
                }
                write!(f, "({}, ", source_type.display(ctx))?;
                self.write_operand(f, *base)?;
                for index in indices {
                    write!(f, ", ")?;
                    self.write_operand(f, *index)?;
                }
                write!(f, ")")
            }
            ValueKind::GlobalVariable(_) | ValueKind::Function(_) => {
                write!(f, "@")?;
                match value.name(ctx) {
                    Some(name) => write_ident(f, name),
                    None => match self.globals.get(&value) {
                        Some(slot) => write!(f, "{slot}"),
                        None => write!(f, "<badref>"),
                    },
                }
            }
            ValueKind::Argument(_) | ValueKind::Instruction(_) => {
                write!(f, "%")?;
                match value.name(ctx) {
                    Some(name) => write_ident(f, name),
                    None => match self.locals.values.get(&value) {
                        Some(slot) => write!(f, "{slot}"),
                        None => write!(f, "<badref>"),
                    },
                }
            }
            ValueKind::Erased => unreachable!("erased values are rejected by the context"),
        }
    }

    fn write_block_ref(&mut self, f: &mut fmt::Formatter<'_>, block: BasicBlock) -> fmt::Result {
        write!(f, "%")?;
        match block.name(self.ctx) {
            Some(name) => write_ident(f, name),
            None => match self.locals.blocks.get(&block) {
                Some(slot) => write!(f, "{slot}"),
                None => write!(f, "<badref>"),
            },
        }
    }
}

fn write_linkage(f: &mut fmt::Formatter<'_>, linkage: Linkage) -> fmt::Result {
    match linkage.keyword() {
        "" => Ok(()),
        keyword => write!(f, "{keyword} "),
    }
}

fn write_calling_conv(f: &mut fmt::Formatter<'_>, cc: CallingConv) -> fmt::Result {
    match cc {
        CallingConv::C => Ok(()),
        cc => write!(f, "{cc} "),
    }
}

/// A name, quoted when it contains characters outside `[-a-zA-Z$._0-9]`
/// or starts with a digit
fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = !name.is_empty()
        && !name.as_bytes()[0].is_ascii_digit()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'$' | b'.' | b'_'));
    if plain {
        return write!(f, "{name}");
    }
    write!(f, "\"")?;
    write_escaped(f, name.as_bytes())?;
    write!(f, "\"")
}

fn write_escaped(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'\\' && b != b'"' {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "\\{b:02X}")?;
        }
    }
    Ok(())
}

pub(crate) fn write_module(f: &mut fmt::Formatter<'_>, ctx: &Context, module: Module) -> fmt::Result {
    Printer::new(ctx, Some(module)).write_module(f, module)
}

pub(crate) fn write_function(f: &mut fmt::Formatter<'_>, ctx: &Context, function: Function) -> fmt::Result {
    Printer::new(ctx, Some(function.parent(ctx))).write_function(f, function)
}

/// Definition form for globals, functions and instructions, `type ref` for
/// everything else
pub(crate) fn write_value(f: &mut fmt::Formatter<'_>, ctx: &Context, value: ValueRef) -> fmt::Result {
    match value.kind(ctx) {
        ValueKind::GlobalVariable(global) => {
            Printer::new(ctx, Some(global.module)).write_global(f, GlobalVariable(value))
        }
        ValueKind::Function(_) => write_function(f, ctx, Function(value)),
        ValueKind::Instruction(inst) => {
            let function = inst.parent.parent(ctx);
            let mut printer = Printer::new(ctx, function.map(|func| func.parent(ctx)));
            if let Some(function) = function {
                printer.enter_function(function);
            }
            printer.write_instruction(f, Instruction(value))
        }
        ValueKind::Argument(arg) => {
            let mut printer = Printer::new(ctx, Some(arg.parent.parent(ctx)));
            printer.enter_function(arg.parent);
            printer.write_operand(f, value)
        }
        _ => Printer::new(ctx, None).write_operand(f, value),
    }
}
