//! Pass definitions
//!
//! A pass reports whether it modified the IR it ran on. The builtin passes
//! are a module printer and the verifier.

use log::{debug, warn};
use std::io::Write;

use irf_ir::{verify_function, verify_module, Context, Function, Module};

/// A pass over a whole module
pub trait ModulePass {
    fn name(&self) -> &str;

    /// Returns true if the module was modified
    fn run_on_module(&mut self, ctx: &mut Context, module: Module) -> bool;
}

/// A pass applied to each defined function of a module in turn
pub trait FunctionPass {
    fn name(&self) -> &str;

    /// Returns true if the function was modified
    fn run_on_function(&mut self, ctx: &mut Context, function: Function) -> bool;
}

/// A pipeline entry
pub enum Pass<'a> {
    Module(Box<dyn ModulePass + 'a>),
    Function(Box<dyn FunctionPass + 'a>),
}

impl<'a> Pass<'a> {
    pub fn module(pass: impl ModulePass + 'a) -> Self {
        Pass::Module(Box::new(pass))
    }

    pub fn function(pass: impl FunctionPass + 'a) -> Self {
        Pass::Function(Box::new(pass))
    }

    pub fn name(&self) -> &str {
        match self {
            Pass::Module(pass) => pass.name(),
            Pass::Function(pass) => pass.name(),
        }
    }
}

/// Writes the textual IR of the module to a stream
pub struct PrintModulePass<W: Write> {
    out: W,
    banner: String,
}

impl<W: Write> PrintModulePass<W> {
    pub fn new(out: W, banner: &str) -> Self {
        Self {
            out,
            banner: banner.to_string(),
        }
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ModulePass for PrintModulePass<W> {
    fn name(&self) -> &str {
        "Print module to stream"
    }

    fn run_on_module(&mut self, ctx: &mut Context, module: Module) -> bool {
        let ctx: &Context = ctx;
        let mut print = || -> std::io::Result<()> {
            if !self.banner.is_empty() {
                writeln!(self.out, "{}", self.banner)?;
            }
            write!(self.out, "{}", module.display(ctx))?;
            self.out.flush()
        };
        if let Err(err) = print() {
            warn!("failed to print module '{}': {err}", module.name(ctx));
        }
        false
    }
}

impl<'a, W: Write + 'a> From<PrintModulePass<W>> for Pass<'a> {
    fn from(pass: PrintModulePass<W>) -> Self {
        Pass::module(pass)
    }
}

/// Print `module` to `os`, preceded by `banner` on its own line when the
/// banner is not empty
pub fn create_print_module_pass<W: Write>(os: W, banner: &str) -> PrintModulePass<W> {
    PrintModulePass::new(os, banner)
}

/// Aborts on structurally broken IR. Runs as a module pass by default, or
/// per function when added through `Pass::function`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerifierPass;

impl ModulePass for VerifierPass {
    fn name(&self) -> &str {
        "Module Verifier"
    }

    fn run_on_module(&mut self, ctx: &mut Context, module: Module) -> bool {
        if let Err(err) = verify_module(ctx, module) {
            panic!("Broken module found, compilation aborted!\n{err}");
        }
        debug!("module '{}' verified", module.name(ctx));
        false
    }
}

impl FunctionPass for VerifierPass {
    fn name(&self) -> &str {
        "Function Verifier"
    }

    fn run_on_function(&mut self, ctx: &mut Context, function: Function) -> bool {
        if let Err(err) = verify_function(ctx, function) {
            panic!("Broken function found, compilation aborted!\n{err}");
        }
        false
    }
}

impl From<VerifierPass> for Pass<'_> {
    fn from(pass: VerifierPass) -> Self {
        Pass::module(pass)
    }
}

pub fn create_verifier_pass() -> VerifierPass {
    VerifierPass
}
