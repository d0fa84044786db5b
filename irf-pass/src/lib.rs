//! IR Facade - Passes and Output
//!
//! A `PassManager` runs an ordered pipeline of passes over one module.
//! Module passes see the whole module; function passes are applied to each
//! defined function in turn. Output goes through `RawFdOStream`, which owns
//! its file until it is closed or dropped.

pub mod stream;
pub mod pass;
pub mod manager;

pub use stream::RawFdOStream;
pub use pass::{
    create_print_module_pass, create_verifier_pass, FunctionPass, ModulePass, Pass,
    PrintModulePass, VerifierPass,
};
pub use manager::PassManager;

pub use irf_common::{OpenFlags, StreamError};
