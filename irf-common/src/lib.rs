//! IR Facade - Common Types and Utilities
//! 
//! This crate contains the enumeration tables shared by every layer of the
//! facade (open flags, linkage, calling conventions, address spaces and
//! thread-local modes) together with the error types.

pub mod error;
pub mod enums;

pub use error::{IrError, StreamError};
pub use enums::*;
