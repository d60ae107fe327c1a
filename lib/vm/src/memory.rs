//! Linear memory objects.
//!
//! The committed size of a memory is tracked in pages, but the backing bytes
//! are only allocated up to the highest offset that has ever been written.
//! Untouched bytes read as zero, which keeps a 1 GiB legacy-toolchain memory
//! from costing 1 GiB up front.

use sandbox_linker_types::{MemoryError, MemoryType, Pages};

/// A linear memory instance.
#[derive(Debug)]
pub struct VMMemory {
    declared: MemoryType,
    size: Pages,
    data: Vec<u8>,
}

impl VMMemory {
    /// Create a new memory sized to the declared minimum.
    pub fn new(ty: &MemoryType) -> Result<Self, MemoryError> {
        if let Some(max) = ty.maximum {
            if max < ty.minimum {
                return Err(MemoryError::MinimumMemoryTooLarge {
                    min_requested: ty.minimum,
                    max_allowed: max,
                });
            }
        }

        Ok(Self {
            declared: *ty,
            size: ty.minimum,
            data: Vec::new(),
        })
    }

    /// The runtime type of this memory: the declared limits with the minimum
    /// raised to the current size.
    pub fn ty(&self) -> MemoryType {
        MemoryType {
            minimum: self.size,
            ..self.declared
        }
    }

    /// The current size in pages.
    pub fn size(&self) -> Pages {
        self.size
    }

    /// The current size in bytes.
    pub fn data_size(&self) -> usize {
        self.size.bytes().0
    }

    /// How many bytes are actually backed by host memory.
    pub fn committed_bytes(&self) -> usize {
        self.data.len()
    }

    fn check_bounds(&self, offset: usize, len: usize) -> Result<(), MemoryError> {
        let size = self.data_size();
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(()),
            _ => Err(MemoryError::OutOfBounds { offset, len, size }),
        }
    }

    fn commit(&mut self, end: usize) {
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
    }

    /// Copy `buf.len()` bytes starting at `offset` into `buf`.
    pub fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), MemoryError> {
        self.check_bounds(offset, buf.len())?;
        let committed = self.data.len();
        for (i, byte) in buf.iter_mut().enumerate() {
            let at = offset + i;
            *byte = if at < committed { self.data[at] } else { 0 };
        }
        Ok(())
    }

    /// Copy `bytes` into the memory starting at `offset`.
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.check_bounds(offset, bytes.len())?;
        if bytes.is_empty() {
            return Ok(());
        }
        let end = offset + bytes.len();
        self.commit(end);
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Set `len` bytes starting at `offset` to `value`.
    pub fn fill(&mut self, offset: usize, value: u8, len: usize) -> Result<(), MemoryError> {
        self.check_bounds(offset, len)?;
        if len == 0 {
            return Ok(());
        }
        let end = offset + len;
        self.commit(end);
        self.data[offset..end].fill(value);
        Ok(())
    }

    /// Copy `len` bytes from `src` to `dst`; the ranges may overlap.
    ///
    /// Only the destination is committed. Source bytes that were never
    /// written are copied as zeros.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) -> Result<(), MemoryError> {
        self.check_bounds(src, len)?;
        self.check_bounds(dst, len)?;
        if len == 0 {
            return Ok(());
        }
        let committed = self.data.len().saturating_sub(src).min(len);
        self.commit(dst + len);
        self.data.copy_within(src..src + committed, dst);
        self.data[dst + committed..dst + len].fill(0);
        Ok(())
    }

    /// Grow memory by the specified amount of pages.
    ///
    /// Returns the previous size in pages.
    pub fn grow<IntoPages>(&mut self, delta: IntoPages) -> Result<Pages, MemoryError>
    where
        IntoPages: Into<Pages>,
    {
        let delta = delta.into();
        let previous = self.size;
        let new_size = previous
            .checked_add(delta)
            .ok_or(MemoryError::CouldNotGrow {
                current: previous,
                attempted_delta: delta,
            })?;
        if let Some(max) = self.declared.maximum {
            if new_size > max {
                return Err(MemoryError::CouldNotGrow {
                    current: previous,
                    attempted_delta: delta,
                });
            }
        }
        self.size = new_size;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_linker_types::WASM_PAGE_SIZE;

    #[test]
    fn rejects_inverted_limits() {
        let ty = MemoryType::new(4, Some(2), false);
        assert!(matches!(
            VMMemory::new(&ty),
            Err(MemoryError::MinimumMemoryTooLarge { .. })
        ));
    }

    #[test]
    fn commits_lazily() {
        let ty = MemoryType::new(16384, None, false);
        let mut memory = VMMemory::new(&ty).unwrap();
        assert_eq!(memory.data_size(), 16384 * WASM_PAGE_SIZE);
        assert_eq!(memory.committed_bytes(), 0);

        memory.write(100, &[1, 2, 3]).unwrap();
        assert_eq!(memory.committed_bytes(), 103);

        let mut buf = [0xff; 4];
        memory.read(101, &mut buf).unwrap();
        assert_eq!(buf, [2, 3, 0, 0]);
    }

    #[test]
    fn bounds_are_checked() {
        let ty = MemoryType::new(1, Some(1), false);
        let mut memory = VMMemory::new(&ty).unwrap();
        assert!(memory.write(WASM_PAGE_SIZE - 4, &[0; 4]).is_ok());
        assert_eq!(
            memory.write(WASM_PAGE_SIZE - 3, &[0; 4]),
            Err(MemoryError::OutOfBounds {
                offset: WASM_PAGE_SIZE - 3,
                len: 4,
                size: WASM_PAGE_SIZE,
            })
        );
        assert!(memory.read(usize::MAX, &mut [0; 2]).is_err());
    }

    #[test]
    fn copy_within_handles_overlap() {
        let ty = MemoryType::new(1, None, false);
        let mut memory = VMMemory::new(&ty).unwrap();
        memory.write(0, b"abcdef").unwrap();
        memory.copy_within(0, 2, 4).unwrap();
        let mut buf = [0; 6];
        memory.read(0, &mut buf).unwrap();
        assert_eq!(&buf, b"ababcd");
    }

    #[test]
    fn empty_ranges_commit_nothing() {
        let ty = MemoryType::new(16384, None, false);
        let mut memory = VMMemory::new(&ty).unwrap();
        let top = memory.data_size();

        memory.write(top - 1, &[]).unwrap();
        memory.fill(top - 1, 0, 0).unwrap();
        memory.copy_within(0, top - 1, 0).unwrap();
        memory.copy_within(top - 1, 0, 0).unwrap();
        assert_eq!(memory.committed_bytes(), 0);

        // Still bounds checked.
        assert!(memory.fill(top + 1, 0, 0).is_err());
    }

    #[test]
    fn copy_within_commits_only_the_destination() {
        let ty = MemoryType::new(16384, None, false);
        let mut memory = VMMemory::new(&ty).unwrap();
        let top = memory.data_size();
        memory.write(0, b"xyz").unwrap();
        memory.write(64, b"stale").unwrap();

        // The source runs past the committed bytes.
        memory.copy_within(top - 8, 64, 5).unwrap();
        assert_eq!(memory.committed_bytes(), 69);
        let mut buf = [0xff; 5];
        memory.read(64, &mut buf).unwrap();
        assert_eq!(buf, [0; 5]);

        memory.copy_within(1, 66, 6).unwrap();
        assert_eq!(memory.committed_bytes(), 72);
        let mut buf = [0xff; 6];
        memory.read(66, &mut buf).unwrap();
        assert_eq!(&buf, b"yz\0\0\0\0");
    }

    #[test]
    fn grow_respects_maximum() {
        let ty = MemoryType::new(1, Some(3), false);
        let mut memory = VMMemory::new(&ty).unwrap();
        assert_eq!(memory.grow(2).unwrap(), Pages(1));
        assert_eq!(memory.size(), Pages(3));
        assert!(memory.grow(1).is_err());
        assert_eq!(memory.ty().minimum, Pages(3));
    }
}
