//! The fixed memory layout the legacy C runtime expects.
//!
//! Modules built by the legacy toolchain import their memory and assume the
//! host put a few things at known addresses: the stack between
//! [`EMSCRIPTEN_STACKTOP`] and [`EMSCRIPTEN_STACK_MAX`], and a block of
//! [`MutableGlobals`] at [`MUTABLE_GLOBALS_ADDRESS`].

use byteorder::{ByteOrder, LittleEndian};
use sandbox_linker_types::{MemoryError, WASM_PAGE_SIZE};
use sandbox_linker_vm::VMMemory;

const PAGE: u32 = WASM_PAGE_SIZE as u32;

/// Byte address of the bottom of the stack.
pub const EMSCRIPTEN_STACKTOP: u32 = 64 * PAGE;

/// Byte address of the top of the stack. The heap starts here.
pub const EMSCRIPTEN_STACK_MAX: u32 = 256 * PAGE;

/// Byte address of the [`MutableGlobals`] block.
pub const MUTABLE_GLOBALS_ADDRESS: u32 = 63 * PAGE;

/// `EINVAL` as the legacy C runtime numbers it.
pub const EINVAL: i32 = 22;

/// Where the legacy runtime's stack and mutable globals live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyLayout {
    /// Bottom of the stack, in bytes.
    pub stack_top: u32,
    /// Top of the stack, in bytes.
    pub stack_max: u32,
    /// Address of the [`MutableGlobals`] block, in bytes.
    pub mutable_globals_address: u32,
}

impl Default for LegacyLayout {
    fn default() -> Self {
        Self {
            stack_top: EMSCRIPTEN_STACKTOP,
            stack_max: EMSCRIPTEN_STACK_MAX,
            mutable_globals_address: MUTABLE_GLOBALS_ADDRESS,
        }
    }
}

impl LegacyLayout {
    /// Address of one field of the [`MutableGlobals`] block.
    pub fn mutable_global(&self, field_offset: u32) -> u32 {
        self.mutable_globals_address.wrapping_add(field_offset)
    }
}

/// Handles the legacy runtime uses for the standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum IoStreamHandle {
    /// Standard error.
    StdErr = 1,
    /// Standard input.
    StdIn = 2,
    /// Standard output.
    StdOut = 3,
}

/// Globals the legacy C runtime reads and writes through memory instead of
/// through wasm globals.
///
/// In memory the block is laid out as a C struct, little-endian:
///
/// | offset | field            | type |
/// |--------|------------------|------|
/// | 0      | `DYNAMICTOP_PTR` | u32  |
/// | 8      | `tempDoublePtr`  | f64  |
/// | 16     | `_stderr`        | i32  |
/// | 20     | `_stdin`         | i32  |
/// | 24     | `_stdout`        | i32  |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutableGlobals {
    /// Current top of the dynamic heap.
    pub dynamictop_ptr: u32,
    /// Scratch space used for bit casts.
    pub temp_double_ptr: f64,
    /// Handle of standard error.
    pub stderr: i32,
    /// Handle of standard input.
    pub stdin: i32,
    /// Handle of standard output.
    pub stdout: i32,
}

impl MutableGlobals {
    /// Size of the block in memory, including trailing padding.
    pub const SIZE: usize = 32;
    /// Offset of `DYNAMICTOP_PTR`.
    pub const DYNAMICTOP_PTR: u32 = 0;
    /// Offset of `tempDoublePtr`.
    pub const TEMP_DOUBLE_PTR: u32 = 8;
    /// Offset of `_stderr`.
    pub const STDERR: u32 = 16;
    /// Offset of `_stdin`.
    pub const STDIN: u32 = 20;
    /// Offset of `_stdout`.
    pub const STDOUT: u32 = 24;

    /// The values a freshly set up legacy memory starts with: the heap
    /// begins at the top of the stack and the streams have their fixed
    /// handles.
    pub fn initial(layout: &LegacyLayout) -> Self {
        Self {
            dynamictop_ptr: layout.stack_max,
            temp_double_ptr: 0.0,
            stderr: IoStreamHandle::StdErr as i32,
            stdin: IoStreamHandle::StdIn as i32,
            stdout: IoStreamHandle::StdOut as i32,
        }
    }

    /// Encode the block.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0; Self::SIZE];
        LittleEndian::write_u32(&mut bytes[0..4], self.dynamictop_ptr);
        LittleEndian::write_f64(&mut bytes[8..16], self.temp_double_ptr);
        LittleEndian::write_i32(&mut bytes[16..20], self.stderr);
        LittleEndian::write_i32(&mut bytes[20..24], self.stdin);
        LittleEndian::write_i32(&mut bytes[24..28], self.stdout);
        bytes
    }

    /// Decode the block.
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            dynamictop_ptr: LittleEndian::read_u32(&bytes[0..4]),
            temp_double_ptr: LittleEndian::read_f64(&bytes[8..16]),
            stderr: LittleEndian::read_i32(&bytes[16..20]),
            stdin: LittleEndian::read_i32(&bytes[20..24]),
            stdout: LittleEndian::read_i32(&bytes[24..28]),
        }
    }

    /// Write the block at `address`. Fails without writing anything if the
    /// block does not fit in the memory.
    pub fn write_to(&self, memory: &mut VMMemory, address: u32) -> Result<(), MemoryError> {
        memory.write(address as usize, &self.to_bytes())
    }

    /// Read the block at `address`.
    pub fn read_from(memory: &VMMemory, address: u32) -> Result<Self, MemoryError> {
        let mut bytes = [0; Self::SIZE];
        memory.read(address as usize, &mut bytes)?;
        Ok(Self::from_bytes(&bytes))
    }
}
