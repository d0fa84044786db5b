//! Enumeration tables
//!
//! Closed sets of symbolic constants shared by every layer. The numeric
//! encodings match the wrapped compiler library exactly; they end up in
//! textual IR and object metadata, so they must never be renumbered.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Flags used when opening a `RawFdOStream`. Combinable with `|`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct OpenFlags: u32 {
        /// Fail if the file already exists
        const EXCL = 1;
        /// Append instead of truncating
        const APPEND = 2;
        /// Text mode (line ending translation on platforms that have it)
        const TEXT = 4;
        /// Open for reading as well as writing
        const RW = 8;
    }
}

impl OpenFlags {
    /// No special flags: create or truncate, write only.
    pub const NONE: Self = Self::empty();
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Linkage types for global symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Linkage {
    External = 0,
    AvailableExternally = 1,
    LinkOnceAny = 2,
    LinkOnceOdr = 3,
    WeakAny = 4,
    WeakOdr = 5,
    Appending = 6,
    Internal = 7,
    Private = 8,
    ExternalWeak = 9,
    Common = 10,
}

impl Linkage {
    const ALL: [Linkage; 11] = [
        Linkage::External,
        Linkage::AvailableExternally,
        Linkage::LinkOnceAny,
        Linkage::LinkOnceOdr,
        Linkage::WeakAny,
        Linkage::WeakOdr,
        Linkage::Appending,
        Linkage::Internal,
        Linkage::Private,
        Linkage::ExternalWeak,
        Linkage::Common,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Keyword used in textual IR. External linkage is implicit and prints nothing.
    pub fn keyword(self) -> &'static str {
        match self {
            Linkage::External => "",
            Linkage::AvailableExternally => "available_externally",
            Linkage::LinkOnceAny => "linkonce",
            Linkage::LinkOnceOdr => "linkonce_odr",
            Linkage::WeakAny => "weak",
            Linkage::WeakOdr => "weak_odr",
            Linkage::Appending => "appending",
            Linkage::Internal => "internal",
            Linkage::Private => "private",
            Linkage::ExternalWeak => "extern_weak",
            Linkage::Common => "common",
        }
    }

    /// Linkages a declaration (no body, no initializer) may carry
    pub fn is_valid_declaration_linkage(self) -> bool {
        matches!(self, Linkage::External | Linkage::ExternalWeak)
    }

    /// Symbols with these linkages are invisible outside their module
    pub fn is_local(self) -> bool {
        matches!(self, Linkage::Internal | Linkage::Private)
    }
}

impl Default for Linkage {
    fn default() -> Self {
        Linkage::External
    }
}

/// Calling conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CallingConv {
    C = 0,
    Fast = 8,
    Cold = 9,
    Ghc = 10,
    HiPE = 11,
    WebKitJs = 12,
    AnyReg = 13,
    PreserveMost = 14,
    PreserveAll = 15,
    X86StdCall = 64,
    X86FastCall = 65,
    ArmApcs = 66,
    ArmAapcs = 67,
    ArmAapcsVfp = 68,
    Msp430Intr = 69,
    X86ThisCall = 70,
    PtxKernel = 71,
    PtxDevice = 72,
    SpirFunc = 75,
    SpirKernel = 76,
    IntelOclBi = 77,
    X86_64SysV = 78,
    X86_64Win64 = 79,
    X86VectorCall = 80,
}

impl CallingConv {
    /// First code reserved for target-specific conventions
    pub const FIRST_TARGET_CC: u32 = 64;

    const ALL: [CallingConv; 24] = [
        CallingConv::C,
        CallingConv::Fast,
        CallingConv::Cold,
        CallingConv::Ghc,
        CallingConv::HiPE,
        CallingConv::WebKitJs,
        CallingConv::AnyReg,
        CallingConv::PreserveMost,
        CallingConv::PreserveAll,
        CallingConv::X86StdCall,
        CallingConv::X86FastCall,
        CallingConv::ArmApcs,
        CallingConv::ArmAapcs,
        CallingConv::ArmAapcsVfp,
        CallingConv::Msp430Intr,
        CallingConv::X86ThisCall,
        CallingConv::PtxKernel,
        CallingConv::PtxDevice,
        CallingConv::SpirFunc,
        CallingConv::SpirKernel,
        CallingConv::IntelOclBi,
        CallingConv::X86_64SysV,
        CallingConv::X86_64Win64,
        CallingConv::X86VectorCall,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|cc| cc.code() == code)
    }

    pub fn is_target_specific(self) -> bool {
        self.code() >= Self::FIRST_TARGET_CC
    }
}

impl Default for CallingConv {
    fn default() -> Self {
        CallingConv::C
    }
}

impl fmt::Display for CallingConv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallingConv::C => write!(f, "ccc"),
            CallingConv::Fast => write!(f, "fastcc"),
            CallingConv::Cold => write!(f, "coldcc"),
            CallingConv::Ghc => write!(f, "ghccc"),
            CallingConv::WebKitJs => write!(f, "webkit_jscc"),
            CallingConv::AnyReg => write!(f, "anyregcc"),
            CallingConv::PreserveMost => write!(f, "preserve_mostcc"),
            CallingConv::PreserveAll => write!(f, "preserve_allcc"),
            CallingConv::X86StdCall => write!(f, "x86_stdcallcc"),
            CallingConv::X86FastCall => write!(f, "x86_fastcallcc"),
            CallingConv::ArmApcs => write!(f, "arm_apcscc"),
            CallingConv::ArmAapcs => write!(f, "arm_aapcscc"),
            CallingConv::ArmAapcsVfp => write!(f, "arm_aapcs_vfpcc"),
            CallingConv::Msp430Intr => write!(f, "msp430_intrcc"),
            CallingConv::X86ThisCall => write!(f, "x86_thiscallcc"),
            CallingConv::PtxKernel => write!(f, "ptx_kernel"),
            CallingConv::PtxDevice => write!(f, "ptx_device"),
            CallingConv::SpirFunc => write!(f, "spir_func"),
            CallingConv::SpirKernel => write!(f, "spir_kernel"),
            CallingConv::IntelOclBi => write!(f, "intel_ocl_bicc"),
            CallingConv::X86_64SysV => write!(f, "x86_64_sysvcc"),
            CallingConv::X86_64Win64 => write!(f, "x86_64_win64cc"),
            CallingConv::X86VectorCall => write!(f, "x86_vectorcallcc"),
            // No keyword, the numeric form is always accepted
            CallingConv::HiPE => write!(f, "cc {}", self.code()),
        }
    }
}

/// Address spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum AddressSpace {
    Generic = 0,
    Global = 1,
    Shared = 3,
    Const = 4,
    Local = 5,
    Param = 101,
}

impl AddressSpace {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(AddressSpace::Generic),
            1 => Some(AddressSpace::Global),
            3 => Some(AddressSpace::Shared),
            4 => Some(AddressSpace::Const),
            5 => Some(AddressSpace::Local),
            101 => Some(AddressSpace::Param),
            _ => None,
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        AddressSpace::Generic
    }
}

/// Thread-local storage models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum ThreadLocalMode {
    NotThreadLocal = 0,
    GeneralDynamic = 1,
    LocalDynamic = 2,
    InitialExec = 3,
    LocalExec = 4,
}

impl ThreadLocalMode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ThreadLocalMode::NotThreadLocal),
            1 => Some(ThreadLocalMode::GeneralDynamic),
            2 => Some(ThreadLocalMode::LocalDynamic),
            3 => Some(ThreadLocalMode::InitialExec),
            4 => Some(ThreadLocalMode::LocalExec),
            _ => None,
        }
    }

    /// Keyword used in textual IR, `None` when not thread local.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ThreadLocalMode::NotThreadLocal => None,
            ThreadLocalMode::GeneralDynamic => Some("thread_local"),
            ThreadLocalMode::LocalDynamic => Some("thread_local(localdynamic)"),
            ThreadLocalMode::InitialExec => Some("thread_local(initialexec)"),
            ThreadLocalMode::LocalExec => Some("thread_local(localexec)"),
        }
    }
}

impl Default for ThreadLocalMode {
    fn default() -> Self {
        ThreadLocalMode::NotThreadLocal
    }
}
