//! Canned modules built through the facade

use clap::ValueEnum;
use log::debug;

use irf_ir::{
    AddressSpace, ApInt, BasicBlock, ConstantInt, Context, Function, FunctionType,
    GlobalVariable, IrBuilder, IrError, Linkage, Module, PointerType, ThreadLocalMode, Type,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sample {
    /// `main` calling `top_level_code`, which prints a greeting with `puts`
    Hello,
    /// A function returning the constant 42
    Answer,
    /// External declarations only
    Declare,
}

impl Sample {
    pub fn name(self) -> &'static str {
        match self {
            Sample::Hello => "hello",
            Sample::Answer => "answer",
            Sample::Declare => "declare",
        }
    }
}

pub fn build(ctx: &mut Context, sample: Sample, module_id: &str) -> Result<Module, IrError> {
    debug!("building sample '{}'", sample.name());
    let module = Module::new(ctx, module_id);
    match sample {
        Sample::Hello => build_hello(ctx, module),
        Sample::Answer => build_answer(ctx, module)?,
        Sample::Declare => build_declare(ctx, module),
    }
    Ok(module)
}

fn declare_puts(ctx: &mut Context, module: Module) -> Function {
    let i8_ty = Type::get_int8_ty(ctx).as_type();
    let i8_ptr = PointerType::get_unqual(ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(ctx).as_type();
    let puts_ty = FunctionType::get(ctx, i32_ty, &[i8_ptr], false);
    Function::create(ctx, puts_ty, Linkage::External, "puts", module)
}

fn build_hello(ctx: &mut Context, module: Module) {
    let puts = declare_puts(ctx, module);
    let void = Type::get_void_ty(ctx);
    let i32_ty = Type::get_int32_ty(ctx);
    let mut builder = IrBuilder::new();

    let tlc_ty = FunctionType::get(ctx, void, &[], false);
    let tlc = Function::create(ctx, tlc_ty, Linkage::Internal, "top_level_code", module);
    builder.position_at_end(BasicBlock::create(ctx, "entry", Some(tlc), None));
    let greeting = builder.create_global_string_ptr(ctx, module, "Hello, world!", ".str");
    builder.create_call(ctx, puts, &[greeting.into()], "");
    builder.create_ret_void(ctx);

    let main_ty = FunctionType::get(ctx, i32_ty.as_type(), &[], false);
    let main = Function::create(ctx, main_ty, Linkage::External, "main", module);
    builder.position_at_end(BasicBlock::create(ctx, "entry", Some(main), None));
    builder.create_call(ctx, tlc, &[], "");
    let zero = ConstantInt::get_signed(ctx, i32_ty, 0);
    builder.create_ret(ctx, zero);
}

fn build_answer(ctx: &mut Context, module: Module) -> Result<(), IrError> {
    let i32_ty = Type::get_int32_ty(ctx).as_type();
    let fn_ty = FunctionType::get(ctx, i32_ty, &[], false);
    let answer = Function::create(ctx, fn_ty, Linkage::External, "answer", module);
    let entry = BasicBlock::create(ctx, "entry", Some(answer), None);

    let mut builder = IrBuilder::new();
    builder.position_at_end(entry);
    let value = ConstantInt::get(ctx, &ApInt::new(32, "42", 10)?);
    builder.create_ret(ctx, value);
    Ok(())
}

fn build_declare(ctx: &mut Context, module: Module) {
    declare_puts(ctx, module);

    let i8_ty = Type::get_int8_ty(ctx).as_type();
    let i8_ptr = PointerType::get_unqual(ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(ctx).as_type();
    let printf_ty = FunctionType::get(ctx, i32_ty, &[i8_ptr], true);
    Function::create(ctx, printf_ty, Linkage::External, "printf", module);

    GlobalVariable::new(
        ctx,
        module,
        i32_ty,
        false,
        Linkage::External,
        None,
        "errno",
        None,
        ThreadLocalMode::InitialExec,
        AddressSpace::Generic,
        false,
    );
}
