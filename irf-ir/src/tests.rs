//! Unit tests for the IR module

use super::*;
use pretty_assertions::assert_eq;

fn i32_const(ctx: &mut Context, value: &str) -> ConstantInt {
    ConstantInt::get(ctx, &ApInt::new(32, value, 10).unwrap())
}

#[test]
fn test_integer_types_are_uniqued() {
    let mut ctx = Context::new();
    let a = IntegerType::get(&mut ctx, 32);
    let b = IntegerType::get(&mut ctx, 32);
    let c = IntegerType::get(&mut ctx, 64);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.bit_width(&ctx), 32);
    assert_eq!(Type::get_int32_ty(&mut ctx), a);
}

#[test]
fn test_function_types_keyed_by_param_list() {
    let mut ctx = Context::new();
    let i32_ty = IntegerType::get(&mut ctx, 32).as_type();

    let two = FunctionType::get(&mut ctx, i32_ty, &[i32_ty, i32_ty], false);
    let one = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let two_again = FunctionType::get(&mut ctx, i32_ty, &[i32_ty, i32_ty], false);
    let variadic = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], true);
    let none = FunctionType::get(&mut ctx, i32_ty, &[], false);

    assert_ne!(two, one);
    assert_eq!(two, two_again);
    assert_ne!(one, variadic);
    assert_eq!(none.num_params(&ctx), 0);
    assert_eq!(two.params(&ctx), &[i32_ty, i32_ty]);
}

#[test]
fn test_derived_type_shapes() {
    let mut ctx = Context::new();
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let arr = ArrayType::get(&mut ctx, i8_ty, 6);
    let ptr = PointerType::get(&mut ctx, arr.as_type(), AddressSpace::Global);

    assert_eq!(arr.num_elements(&ctx), 6);
    assert_eq!(arr.element_type(&ctx), i8_ty);
    assert_eq!(ptr.element_type(&ctx), arr.as_type());
    assert_eq!(ptr.address_space(&ctx), AddressSpace::Global);
    assert_eq!(ptr.as_type().display(&ctx).to_string(), "[6 x i8] addrspace(1)*");
    assert_ne!(ptr, PointerType::get(&mut ctx, arr.as_type(), AddressSpace::Generic));

    assert!(IntegerType::dyn_cast(&ctx, arr).is_none());
    assert_eq!(ArrayType::dyn_cast(&ctx, arr.as_type()), Some(arr));
}

#[test]
fn test_type_display() {
    let mut ctx = Context::new();
    let void = Type::get_void_ty(&mut ctx);
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let i8_ptr = PointerType::get_unqual(&mut ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();

    let printf = FunctionType::get(&mut ctx, i32_ty, &[i8_ptr], true);
    let thunk = FunctionType::get(&mut ctx, void, &[], false);
    let any = FunctionType::get(&mut ctx, void, &[], true);

    assert_eq!(printf.as_type().display(&ctx).to_string(), "i32 (i8*, ...)");
    assert_eq!(thunk.as_type().display(&ctx).to_string(), "void ()");
    assert_eq!(any.as_type().display(&ctx).to_string(), "void (...)");
}

#[test]
fn test_constant_int_round_trip() {
    let mut ctx = Context::new();
    let cases = [
        (32, "42", 10, 42i64),
        (8, "300", 10, 44),
        (8, "-1", 10, -1),
        (16, "7fff", 16, 32767),
        (16, "8000", 16, -32768),
        (4, "1111", 2, -1),
    ];
    for (bits, text, radix, expected) in cases {
        let c = ConstantInt::get(&mut ctx, &ApInt::new(bits, text, radix).unwrap());
        assert_eq!(c.value(&ctx).sext_value(), Some(expected), "{text} in i{bits}");
        assert_eq!(c.get_type(&ctx).bit_width(&ctx), bits);
    }
}

#[test]
fn test_constant_ints_are_uniqued() {
    let mut ctx = Context::new();
    let a = i32_const(&mut ctx, "42");
    let b = i32_const(&mut ctx, "42");
    let c = i32_const(&mut ctx, "43");
    let wide = ConstantInt::get(&mut ctx, &ApInt::new(64, "42", 10).unwrap());

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a.as_value(), wide.as_value());
}

#[test]
fn test_get_string_element_count() {
    let mut ctx = Context::new();
    let with_null = ConstantDataArray::get_string(&mut ctx, "ab", true);
    let without = ConstantDataArray::get_string(&mut ctx, "ab", false);

    let with_ty = ArrayType::dyn_cast(&ctx, with_null.get_type(&ctx)).unwrap();
    let without_ty = ArrayType::dyn_cast(&ctx, without.get_type(&ctx)).unwrap();
    assert_eq!(with_ty.num_elements(&ctx), 3);
    assert_eq!(without_ty.num_elements(&ctx), 2);
    assert_eq!(ConstantDataArray::as_bytes(&ctx, with_null), Some(&b"ab\0"[..]));
    assert_eq!(ConstantDataArray::as_bytes(&ctx, without), Some(&b"ab"[..]));
}

#[test]
fn test_get_string_stops_at_nul() {
    let mut ctx = Context::new();
    let s = ConstantDataArray::get_string(&mut ctx, "a\0b", true);
    assert_eq!(ConstantDataArray::as_bytes(&ctx, s), Some(&b"a\0"[..]));
}

#[test]
fn test_constant_gep() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let init = ConstantDataArray::get_string(&mut ctx, "hi", true);
    let arr_ty = init.get_type(&ctx);
    let global = GlobalVariable::new(
        &mut ctx, module, arr_ty, true, Linkage::Private, Some(init), "s", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
    let zero: Constant = i32_const(&mut ctx, "0").into();

    let gep = ConstantExpr::get_get_element_ptr(&mut ctx, global.into(), &[zero, zero], true);
    let again = ConstantExpr::get_get_element_ptr(&mut ctx, global.into(), &[zero, zero], true);
    let loose = ConstantExpr::get_get_element_ptr(&mut ctx, global.into(), &[zero, zero], false);

    assert_eq!(gep, again);
    assert_ne!(gep, loose);
    assert_eq!(gep.get_type(&ctx).display(&ctx).to_string(), "i8*");
    assert_eq!(ConstantExpr::gep_source_type(&ctx, gep), Some(arr_ty));
    assert_eq!(
        gep.as_value().display(&ctx).to_string(),
        "i8* getelementptr inbounds ([3 x i8], [3 x i8]* @s, i32 0, i32 0)"
    );

    // a single index keeps the pointee type
    let one = ConstantExpr::get_get_element_ptr(&mut ctx, global.into(), &[zero], false);
    assert_eq!(one.get_type(&ctx), global.as_value().get_type(&ctx));
}

#[test]
#[should_panic(expected = "non-aggregate")]
fn test_gep_into_scalar_is_fatal() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let global = GlobalVariable::new(
        &mut ctx, module, i32_ty, false, Linkage::External, None, "x", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
    let zero: Constant = i32_const(&mut ctx, "0").into();
    ConstantExpr::get_get_element_ptr(&mut ctx, global.into(), &[zero, zero], true);
}

#[test]
fn test_declaration_has_empty_body() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty, i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);

    assert!(g.is_declaration(&ctx));
    assert_eq!(g.state(&ctx), FunctionState::Declared);
    assert!(g.basic_blocks(&ctx).is_empty());
    assert_eq!(g.args(&ctx).len(), 2);
    assert_eq!(g.display(&ctx).to_string(), "declare i32 @g(i32, i32)\n");
}

#[test]
fn test_return_constant_prints() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    let answer = ConstantInt::get(&mut ctx, &ApInt::new(32, "42", 10).unwrap());
    ReturnInst::create(&mut ctx, Some(answer.into()), entry);

    assert_eq!(f.state(&ctx), FunctionState::WellFormed);
    assert_eq!(
        module.display(&ctx).to_string(),
        "; ModuleID = 'm'\n\ndefine i32 @f() {\nentry:\n  ret i32 42\n}\n"
    );
    assert!(verify_module(&ctx, module).is_ok());
}

#[test]
fn test_hello_world_module() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "hello");
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let i8_ptr = PointerType::get_unqual(&mut ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();

    let puts_ty = FunctionType::get(&mut ctx, i32_ty, &[i8_ptr], false);
    let puts = Function::create(&mut ctx, puts_ty, Linkage::External, "puts", module);
    let main_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let main = Function::create(&mut ctx, main_ty, Linkage::External, "main", module);

    let mut builder = IrBuilder::new();
    let entry = BasicBlock::create(&mut ctx, "entry", Some(main), None);
    builder.position_at_end(entry);
    let text = builder.create_global_string_ptr(&mut ctx, module, "hello", ".str");
    builder.create_call(&mut ctx, puts, &[text.into()], "call");
    let i32_int = IntegerType::get(&mut ctx, 32);
    let zero = ConstantInt::get_signed(&mut ctx, i32_int, 0);
    builder.create_ret(&mut ctx, zero);

    let expected = "\
; ModuleID = 'hello'

@.str = private constant [6 x i8] c\"hello\\00\"

declare i32 @puts(i8*)

define i32 @main() {
entry:
  %call = call i32 @puts(i8* getelementptr inbounds ([6 x i8], [6 x i8]* @.str, i32 0, i32 0))
  ret i32 0
}
";
    assert_eq!(module.display(&ctx).to_string(), expected);
    assert!(verify_module(&ctx, module).is_ok());
}

#[test]
fn test_unnamed_values_are_numbered() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let id = Function::create(&mut ctx, fn_ty, Linkage::Internal, "id", module);
    let entry = BasicBlock::create(&mut ctx, "", Some(id), None);
    let arg = id.arg(&ctx, 0).as_value();
    let call = CallInst::create(&mut ctx, id, &[arg], "", entry);
    let exit = BasicBlock::create(&mut ctx, "", Some(id), None);
    BranchInst::create(&mut ctx, exit, entry);
    ReturnInst::create(&mut ctx, Some(call.into()), exit);

    let expected = "\
define internal i32 @id(i32 %0) {
  %2 = call i32 @id(i32 %0)
  br label %3

; <label>:3
  ret i32 %2
}
";
    assert_eq!(id.display(&ctx).to_string(), expected);
}

#[test]
fn test_names_are_uniqued() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let first = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    let second = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);

    assert_eq!(first.name(&ctx), Some("f"));
    assert_eq!(second.name(&ctx), Some("f.1"));
    assert_eq!(module.get_function(&ctx, "f"), Some(first));
    assert_eq!(module.get_function(&ctx, "f.1"), Some(second));

    let a = BasicBlock::create(&mut ctx, "bb", Some(first), None);
    let b = BasicBlock::create(&mut ctx, "bb", Some(first), None);
    assert_eq!(a.name(&ctx), Some("bb"));
    assert_eq!(b.name(&ctx), Some("bb1"));

    second.as_value().set_name(&mut ctx, "g");
    assert_eq!(module.get_function(&ctx, "g"), Some(second));
    assert_eq!(module.get_function(&ctx, "f.1"), None);
}

#[test]
fn test_block_insertion_order() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);

    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    let exit = BasicBlock::create(&mut ctx, "exit", Some(f), None);
    let middle = BasicBlock::create(&mut ctx, "middle", Some(f), Some(exit));
    let detached = BasicBlock::create(&mut ctx, "late", None, None);
    assert_eq!(detached.parent(&ctx), None);
    detached.insert_into(&mut ctx, f, Some(entry));

    assert_eq!(f.basic_blocks(&ctx), &[detached, entry, middle, exit]);
    assert_eq!(f.entry_block(&ctx), Some(detached));
    assert_eq!(middle.parent(&ctx), Some(f));
}

#[test]
fn test_function_state_machine() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    assert_eq!(f.state(&ctx), FunctionState::Declared);

    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    assert_eq!(f.state(&ctx), FunctionState::Defining);
    assert!(verify_function(&ctx, f).is_err());

    let ret = ReturnInst::create(&mut ctx, None, entry);
    assert_eq!(f.state(&ctx), FunctionState::WellFormed);
    assert_eq!(entry.terminator(&ctx), Some(Instruction::from(ret)));
    assert!(verify_function(&ctx, f).is_ok());
}

#[test]
#[should_panic(expected = "after its terminator")]
fn test_no_instruction_after_terminator() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    ReturnInst::create(&mut ctx, None, entry);
    CallInst::create(&mut ctx, f, &[], "", entry);
}

#[test]
#[should_panic(expected = "expects 2 arguments, got 1")]
fn test_call_argument_count_is_checked() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty, i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(g), None);
    let one = i32_const(&mut ctx, "1");
    CallInst::create(&mut ctx, g, &[one.into()], "", entry);
}

#[test]
#[should_panic(expected = "parameter expects i32")]
fn test_call_argument_type_is_checked() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(g), None);
    let wide = ConstantInt::get(&mut ctx, &ApInt::new(64, "1", 10).unwrap());
    CallInst::create(&mut ctx, g, &[wide.into()], "", entry);
}

#[test]
#[should_panic(expected = "ret void in function 'f' returning i32")]
fn test_return_type_is_checked() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    ReturnInst::create(&mut ctx, None, entry);
}

#[test]
fn test_variadic_call_prints_pointer_type() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let i8_ptr = PointerType::get_unqual(&mut ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let printf_ty = FunctionType::get(&mut ctx, i32_ty, &[i8_ptr], true);
    let printf = Function::create(&mut ctx, printf_ty, Linkage::External, "printf", module);
    let main_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let main = Function::create(&mut ctx, main_ty, Linkage::External, "main", module);

    let mut builder = IrBuilder::new();
    builder.position_at_end(BasicBlock::create(&mut ctx, "entry", Some(main), None));
    let fmt = builder.create_global_string_ptr(&mut ctx, module, "%d\n", "fmt");
    let seven = i32_const(&mut ctx, "7");
    let call = builder.create_call(&mut ctx, printf, &[fmt.into(), seven.into()], "n");

    assert_eq!(call.args(&ctx).len(), 2);
    assert_eq!(call.function_type(&ctx), printf_ty);
    assert_eq!(
        call.as_value().display(&ctx).to_string(),
        "%n = call i32 (i8*, ...)* @printf(i8* getelementptr inbounds ([4 x i8], [4 x i8]* @fmt, i32 0, i32 0), i32 7)"
    );
    assert_eq!(
        module.get_global_variable(&ctx, "fmt").map(|g| g.as_value().display(&ctx).to_string()),
        Some("@fmt = private constant [4 x i8] c\"%d\\0A\\00\"".to_string())
    );
}

#[test]
fn test_global_variable_attributes() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let seven = i32_const(&mut ctx, "7");

    let tls = GlobalVariable::new(
        &mut ctx, module, i32_ty, false, Linkage::External, Some(seven.into()), "g", None,
        ThreadLocalMode::GeneralDynamic, AddressSpace::Global, true,
    );
    let ext = GlobalVariable::new(
        &mut ctx, module, i32_ty, false, Linkage::External, None, "ext", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
    let first = GlobalVariable::new(
        &mut ctx, module, i32_ty, true, Linkage::Internal, Some(seven.into()), "first", Some(tls),
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );

    assert_eq!(module.globals(&ctx), &[first, tls, ext]);
    assert!(ext.is_declaration(&ctx));
    assert_eq!(tls.address_space(&ctx), AddressSpace::Global);
    assert_eq!(
        tls.as_value().get_type(&ctx).display(&ctx).to_string(),
        "i32 addrspace(1)*"
    );

    let expected = "\
; ModuleID = 'm'

@first = internal constant i32 7
@g = thread_local addrspace(1) externally_initialized global i32 7
@ext = external global i32
";
    assert_eq!(module.display(&ctx).to_string(), expected);
}

#[test]
#[should_panic(expected = "does not match global type")]
fn test_initializer_type_is_checked() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let seven = i32_const(&mut ctx, "7");
    GlobalVariable::new(
        &mut ctx, module, i8_ty, false, Linkage::External, Some(seven.into()), "g", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
}

#[test]
fn test_calling_conv_and_quoted_names() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "my func", module);
    f.set_calling_conv(&mut ctx, CallingConv::Fast);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    let call = CallInst::create(&mut ctx, f, &[], "", entry);
    call.set_calling_conv(&mut ctx, CallingConv::Fast);
    ReturnInst::create(&mut ctx, None, entry);

    assert_eq!(f.calling_conv(&ctx), CallingConv::Fast);
    let expected = "\
define fastcc void @\"my func\"() {
entry:
  call fastcc void @\"my func\"()
  ret void
}
";
    assert_eq!(f.display(&ctx).to_string(), expected);
}

#[test]
fn test_conditional_branch() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i1_ty = Type::get_int1_ty(&mut ctx).as_type();
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i1_ty], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "pick", module);
    f.arg(&ctx, 0).set_name(&mut ctx, "c");

    let entry = BasicBlock::create(&mut ctx, "entry", Some(f), None);
    let yes = BasicBlock::create(&mut ctx, "yes", Some(f), None);
    let no = BasicBlock::create(&mut ctx, "no", Some(f), None);
    let cond = f.arg(&ctx, 0).as_value();
    let br = BranchInst::create_cond(&mut ctx, yes, no, cond, entry);
    let one = i32_const(&mut ctx, "1");
    let two = i32_const(&mut ctx, "2");
    ReturnInst::create(&mut ctx, Some(one.into()), yes);
    ReturnInst::create(&mut ctx, Some(two.into()), no);

    assert_eq!(br.successors(&ctx), vec![yes, no]);
    let expected = "\
define i32 @pick(i1 %c) {
entry:
  br i1 %c, label %yes, label %no

yes:
  ret i32 1

no:
  ret i32 2
}
";
    assert_eq!(f.display(&ctx).to_string(), expected);
    assert!(verify_function(&ctx, f).is_ok());
}

#[test]
fn test_boolean_constants_print_as_keywords() {
    let mut ctx = Context::new();
    let t = ConstantInt::get_true(&mut ctx);
    let f = ConstantInt::get_false(&mut ctx);
    assert_eq!(t.as_value().display(&ctx).to_string(), "i1 true");
    assert_eq!(f.as_value().display(&ctx).to_string(), "i1 false");
}

#[test]
fn test_downcasts_follow_the_hierarchy() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    let c = i32_const(&mut ctx, "5");

    assert!(Constant::dyn_cast(&ctx, f).is_some());
    assert!(Constant::dyn_cast(&ctx, c).is_some());
    assert!(ConstantInt::dyn_cast(&ctx, f).is_none());
    assert!(GlobalVariable::dyn_cast(&ctx, f).is_none());
    assert_eq!(Function::dyn_cast(&ctx, f.as_value()), Some(f));

    let as_constant: Constant = f.into();
    assert_eq!(as_constant.as_value(), f.as_value());
}

#[test]
fn test_erase_module_leaves_siblings_intact() {
    let mut ctx = Context::new();
    let doomed = Module::new(&mut ctx, "doomed");
    let kept = Module::new(&mut ctx, "kept");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);

    let gone = Function::create(&mut ctx, fn_ty, Linkage::External, "f", doomed);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(gone), None);
    ReturnInst::create(&mut ctx, None, entry);
    Function::create(&mut ctx, fn_ty, Linkage::External, "f", kept);

    doomed.erase(&mut ctx);

    assert_eq!(ctx.modules().collect::<Vec<_>>(), vec![kept]);
    assert_eq!(
        kept.display(&ctx).to_string(),
        "; ModuleID = 'kept'\n\ndeclare void @f()\n"
    );
    // types survive the module
    assert_eq!(FunctionType::get(&mut ctx, void, &[], false), fn_ty);
}

#[test]
#[should_panic(expected = "after its module was erased")]
fn test_use_after_erase_is_fatal() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    let f = Function::create(&mut ctx, fn_ty, Linkage::External, "f", module);
    module.erase(&mut ctx);
    f.name(&ctx);
}

#[test]
#[should_panic(expected = "belongs to context")]
fn test_cross_context_value_is_fatal() {
    let mut c1 = Context::new();
    let mut c2 = Context::new();
    let module = Module::new(&mut c2, "m");
    let foreign = i32_const(&mut c1, "1");
    let i32_ty = Type::get_int32_ty(&mut c2).as_type();
    let fn_ty = FunctionType::get(&mut c2, i32_ty, &[], false);
    let f = Function::create(&mut c2, fn_ty, Linkage::External, "f", module);
    let entry = BasicBlock::create(&mut c2, "entry", Some(f), None);
    ReturnInst::create(&mut c2, Some(foreign.into()), entry);
}

#[test]
fn test_verifier_rejects_bad_declaration_linkage() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let void = Type::get_void_ty(&mut ctx);
    let fn_ty = FunctionType::get(&mut ctx, void, &[], false);
    Function::create(&mut ctx, fn_ty, Linkage::Internal, "hidden", module);

    let err = verify_module(&ctx, module).unwrap_err();
    assert!(matches!(err, IrError::Verify { ref function, .. } if function == "hidden"));
}

#[test]
fn test_handles_serialize() {
    let mut ctx = Context::new();
    let ty = Type::get_int32_ty(&mut ctx);
    let json = serde_json::to_string(&ty).unwrap();
    let back: IntegerType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ty);
    assert_eq!(back.bit_width(&ctx), 32);
}

/// A string global `s` in a fresh module, with an `i8*` to its first byte
fn module_with_string(ctx: &mut Context, id: &str) -> (Module, Constant) {
    let module = Module::new(ctx, id);
    let init = ConstantDataArray::get_string(ctx, "hi", true);
    let arr_ty = init.get_type(ctx);
    let global = GlobalVariable::new(
        ctx, module, arr_ty, true, Linkage::Private, Some(init), "s", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
    let zero: Constant = i32_const(ctx, "0").into();
    let ptr = ConstantExpr::get_get_element_ptr(ctx, global.into(), &[zero, zero], true);
    (module, ptr)
}

#[test]
#[should_panic(expected = "refers to module 'b', used in module 'a'")]
fn test_initializer_from_other_module_is_fatal() {
    let mut ctx = Context::new();
    let (a, _) = module_with_string(&mut ctx, "a");
    let (_, foreign) = module_with_string(&mut ctx, "b");
    let ptr_ty = foreign.get_type(&ctx);
    GlobalVariable::new(
        &mut ctx, a, ptr_ty, false, Linkage::External, Some(foreign), "p", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
}

#[test]
#[should_panic(expected = "refers to module 'b', used in module 'a'")]
fn test_set_initializer_from_other_module_is_fatal() {
    let mut ctx = Context::new();
    let (a, _) = module_with_string(&mut ctx, "a");
    let (_, foreign) = module_with_string(&mut ctx, "b");
    let ptr_ty = foreign.get_type(&ctx);
    let p = GlobalVariable::new(
        &mut ctx, a, ptr_ty, false, Linkage::External, None, "p", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );
    p.set_initializer(&mut ctx, Some(foreign));
}

#[test]
#[should_panic(expected = "refers to module 'b', used in module 'a'")]
fn test_call_argument_from_other_module_is_fatal() {
    let mut ctx = Context::new();
    let (a, _) = module_with_string(&mut ctx, "a");
    let (_, foreign) = module_with_string(&mut ctx, "b");
    let i8_ty = Type::get_int8_ty(&mut ctx).as_type();
    let i8_ptr = PointerType::get_unqual(&mut ctx, i8_ty).as_type();
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let puts_ty = FunctionType::get(&mut ctx, i32_ty, &[i8_ptr], false);
    let puts = Function::create(&mut ctx, puts_ty, Linkage::External, "puts", a);
    let main_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let main = Function::create(&mut ctx, main_ty, Linkage::External, "main", a);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(main), None);
    CallInst::create(&mut ctx, puts, &[foreign.into()], "", entry);
}

#[test]
fn test_erasing_sibling_keeps_survivor_printable() {
    let mut ctx = Context::new();
    let (a, local) = module_with_string(&mut ctx, "a");
    let (b, _) = module_with_string(&mut ctx, "b");
    let ptr_ty = local.get_type(&ctx);
    GlobalVariable::new(
        &mut ctx, a, ptr_ty, false, Linkage::External, Some(local), "p", None,
        ThreadLocalMode::NotThreadLocal, AddressSpace::Generic, false,
    );

    b.erase(&mut ctx);

    assert!(verify_module(&ctx, a).is_ok());
    let expected = "\
; ModuleID = 'a'

@s = private constant [3 x i8] c\"hi\\00\"
@p = global i8* getelementptr inbounds ([3 x i8], [3 x i8]* @s, i32 0, i32 0)
";
    assert_eq!(a.display(&ctx).to_string(), expected);
}

#[test]
#[should_panic(expected = "operand #")]
fn test_argument_of_other_function_is_fatal() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let h = Function::create(&mut ctx, fn_ty, Linkage::External, "h", module);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(h), None);
    let x = g.arg(&ctx, 0);
    ReturnInst::create(&mut ctx, Some(x.into()), entry);
}

#[test]
#[should_panic(expected = "of function 'g' used in function 'h'")]
fn test_inserting_block_with_foreign_operand_is_fatal() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let h = Function::create(&mut ctx, fn_ty, Linkage::External, "h", module);
    let x = g.arg(&ctx, 0);

    let detached = BasicBlock::create(&mut ctx, "entry", None, None);
    ReturnInst::create(&mut ctx, Some(x.into()), detached);
    detached.insert_into(&mut ctx, h, None);
}

#[test]
fn test_verifier_rejects_operand_of_other_function() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[i32_ty], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let h = Function::create(&mut ctx, fn_ty, Linkage::External, "h", module);
    let one = i32_const(&mut ctx, "1");

    // both blocks detached while wired together, then split across functions
    let producer = BasicBlock::create(&mut ctx, "entry", None, None);
    let value = CallInst::create(&mut ctx, g, &[one.into()], "v", producer);
    let consumer = BasicBlock::create(&mut ctx, "entry", None, None);
    ReturnInst::create(&mut ctx, Some(value.into()), consumer);
    consumer.insert_into(&mut ctx, h, None);
    ReturnInst::create(&mut ctx, Some(value.into()), producer);
    producer.insert_into(&mut ctx, g, None);

    assert!(verify_function(&ctx, g).is_ok());
    let err = verify_function(&ctx, h).unwrap_err();
    assert!(
        matches!(err, IrError::Verify { ref function, ref message }
            if function == "h" && message.contains("of function 'g' used in function 'h'")),
        "unexpected error: {err}"
    );
}

#[test]
fn test_verifier_rejects_operand_from_detached_block() {
    let mut ctx = Context::new();
    let module = Module::new(&mut ctx, "m");
    let i32_ty = Type::get_int32_ty(&mut ctx).as_type();
    let fn_ty = FunctionType::get(&mut ctx, i32_ty, &[], false);
    let g = Function::create(&mut ctx, fn_ty, Linkage::External, "g", module);
    let h = Function::create(&mut ctx, fn_ty, Linkage::External, "h", module);

    let loose = BasicBlock::create(&mut ctx, "loose", None, None);
    let value = CallInst::create(&mut ctx, g, &[], "v", loose);
    let entry = BasicBlock::create(&mut ctx, "entry", Some(h), None);
    ReturnInst::create(&mut ctx, Some(value.into()), entry);

    let err = verify_function(&ctx, h).unwrap_err();
    assert!(err.to_string().contains("detached block"), "unexpected error: {err}");
}
