//! Function tables.
//!
//! Like memories, tables are sized logically and backed sparsely: the legacy
//! toolchain asks for tens of millions of slots and touches very few.

use crate::FunctionHandle;
use sandbox_linker_types::{TableError, TableType};

/// A table instance.
#[derive(Debug)]
pub struct VMTable {
    declared: TableType,
    size: u32,
    elements: Vec<Option<FunctionHandle>>,
}

impl VMTable {
    /// Create a new table sized to the declared minimum, with every slot
    /// empty.
    pub fn new(ty: &TableType) -> Result<Self, TableError> {
        if let Some(maximum) = ty.maximum {
            if maximum < ty.minimum {
                return Err(TableError::MinimumTooLarge {
                    minimum: ty.minimum,
                    maximum,
                });
            }
        }
        Ok(Self {
            declared: *ty,
            size: ty.minimum,
            elements: Vec::new(),
        })
    }

    /// The runtime type of this table.
    pub fn ty(&self) -> TableType {
        TableType {
            minimum: self.size,
            ..self.declared
        }
    }

    /// Current number of slots.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Read slot `index`.
    pub fn get(&self, index: u32) -> Result<Option<FunctionHandle>, TableError> {
        if index >= self.size {
            return Err(TableError::OutOfBounds {
                index,
                size: self.size,
            });
        }
        Ok(self.elements.get(index as usize).copied().flatten())
    }

    /// Write slot `index`.
    pub fn set(&mut self, index: u32, value: Option<FunctionHandle>) -> Result<(), TableError> {
        if index >= self.size {
            return Err(TableError::OutOfBounds {
                index,
                size: self.size,
            });
        }
        let index = index as usize;
        if self.elements.len() <= index {
            if value.is_none() {
                return Ok(());
            }
            self.elements.resize(index + 1, None);
        }
        self.elements[index] = value;
        Ok(())
    }

    /// Grow the table by `delta` empty slots, returning the previous size.
    pub fn grow(&mut self, delta: u32) -> Result<u32, TableError> {
        let current = self.size;
        let new_size = current
            .checked_add(delta)
            .filter(|size| self.declared.maximum.is_none_or(|max| *size <= max))
            .ok_or(TableError::CouldNotGrow { current, delta })?;
        self.size = new_size;
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_linker_types::Type;

    #[test]
    fn huge_tables_are_sparse() {
        let ty = TableType::new(Type::FuncRef, 40_000_000, Some(60_000_000));
        let mut table = VMTable::new(&ty).unwrap();
        assert_eq!(table.size(), 40_000_000);
        assert_eq!(table.get(39_999_999).unwrap(), None);
        table.set(39_999_999, None).unwrap();
        assert!(table.elements.is_empty());
        assert!(table.get(40_000_000).is_err());
    }

    #[test]
    fn grow_is_bounded() {
        let ty = TableType::new(Type::FuncRef, 1, Some(2));
        let mut table = VMTable::new(&ty).unwrap();
        assert_eq!(table.grow(1).unwrap(), 1);
        assert_eq!(
            table.grow(1),
            Err(TableError::CouldNotGrow {
                current: 2,
                delta: 1
            })
        );
    }
}
