//! Pass Manager
//!
//! Runs every pass of the pipeline in insertion order. A pass reporting a
//! change does not stop the pipeline.

use log::debug;

use irf_ir::{Context, Function, Module};

use crate::pass::Pass;

/// Ordered pipeline of passes over a single module
#[derive(Default)]
pub struct PassManager<'a> {
    passes: Vec<Pass<'a>>,
}

impl<'a> PassManager<'a> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append `pass` to the pipeline
    pub fn add(&mut self, pass: impl Into<Pass<'a>>) {
        self.passes.push(pass.into());
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run the pipeline over `module`. Returns true if any pass modified it.
    pub fn run(&mut self, ctx: &mut Context, module: Module) -> bool {
        let mut changed = false;
        for pass in &mut self.passes {
            debug!("running '{}' on module '{}'", pass.name(), module.name(ctx));
            let modified = match pass {
                Pass::Module(pass) => pass.run_on_module(ctx, module),
                Pass::Function(pass) => {
                    let functions: Vec<Function> = module.functions(ctx).to_vec();
                    let mut modified = false;
                    for function in functions {
                        if function.is_declaration(ctx) {
                            continue;
                        }
                        modified |= pass.run_on_function(ctx, function);
                    }
                    modified
                }
            };
            debug!("finished '{}', modified: {modified}", pass.name());
            changed |= modified;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::{FunctionPass, ModulePass};
    use irf_ir::{BasicBlock, FunctionType, IrBuilder, Linkage, Type};
    use std::cell::Cell;

    struct Report<'c> {
        modified: bool,
        runs: &'c Cell<u32>,
    }

    impl ModulePass for Report<'_> {
        fn name(&self) -> &str {
            "report"
        }

        fn run_on_module(&mut self, _ctx: &mut Context, _module: Module) -> bool {
            self.runs.set(self.runs.get() + 1);
            self.modified
        }
    }

    impl FunctionPass for Report<'_> {
        fn name(&self) -> &str {
            "report"
        }

        fn run_on_function(&mut self, _ctx: &mut Context, _function: Function) -> bool {
            self.runs.set(self.runs.get() + 1);
            self.modified
        }
    }

    fn module_with_two_definitions(ctx: &mut Context) -> Module {
        let module = Module::new(ctx, "m");
        let void = Type::get_void_ty(ctx);
        let fn_ty = FunctionType::get(ctx, void, &[], false);
        Function::create(ctx, fn_ty, Linkage::External, "declared", module);
        let mut builder = IrBuilder::new();
        for name in ["a", "b"] {
            let function = Function::create(ctx, fn_ty, Linkage::External, name, module);
            builder.position_at_end(BasicBlock::create(ctx, "entry", Some(function), None));
            builder.create_ret_void(ctx);
        }
        module
    }

    #[test]
    fn test_empty_pipeline_reports_unmodified() {
        let mut ctx = Context::new();
        let module = module_with_two_definitions(&mut ctx);
        let before = module.display(&ctx).to_string();

        let mut pm = PassManager::new();
        assert!(pm.is_empty());
        assert!(!pm.run(&mut ctx, module));
        assert_eq!(module.display(&ctx).to_string(), before);
    }

    #[test]
    fn test_modified_is_or_of_all_passes() {
        let mut ctx = Context::new();
        let module = module_with_two_definitions(&mut ctx);
        let runs = Cell::new(0);

        let mut pm = PassManager::new();
        pm.add(Pass::module(Report { modified: true, runs: &runs }));
        pm.add(Pass::module(Report { modified: false, runs: &runs }));
        assert_eq!(pm.len(), 2);
        assert!(pm.run(&mut ctx, module));
        // the second pass still ran after the first reported a change
        assert_eq!(runs.get(), 2);

        let mut quiet = PassManager::new();
        quiet.add(Pass::module(Report { modified: false, runs: &runs }));
        assert!(!quiet.run(&mut ctx, module));
    }

    #[test]
    fn test_function_pass_runs_per_definition() {
        let mut ctx = Context::new();
        let module = module_with_two_definitions(&mut ctx);
        let runs = Cell::new(0);

        let mut pm = PassManager::new();
        pm.add(Pass::function(Report { modified: false, runs: &runs }));
        assert!(!pm.run(&mut ctx, module));
        assert_eq!(runs.get(), 2);

        assert!(!pm.run(&mut ctx, module));
        assert_eq!(runs.get(), 4);
    }
}
