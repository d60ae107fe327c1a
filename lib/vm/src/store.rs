use crate::{VMFunction, VMGlobal, VMInstance, VMMemory, VMTable};
use sandbox_linker_types::CompartmentId;
use std::{fmt, marker::PhantomData, num::NonZeroUsize};

/// Trait to represent an object owned by a compartment. This is implemented
/// on the VM types managed by the compartment.
pub trait CompartmentObject: Sized {
    /// List the objects of this kind in the compartment.
    fn list(compartment: &Compartment) -> &Vec<Self>;

    /// List the objects of this kind in the compartment, mutably.
    fn list_mut(compartment: &mut Compartment) -> &mut Vec<Self>;
}

macro_rules! impl_compartment_object {
    ($($field:ident => $ty:ty,)*) => {
        $(
            impl CompartmentObject for $ty {
                fn list(compartment: &Compartment) -> &Vec<Self> {
                    &compartment.$field
                }
                fn list_mut(compartment: &mut Compartment) -> &mut Vec<Self> {
                    &mut compartment.$field
                }
            }
        )*
    };
}

impl_compartment_object! {
    functions => VMFunction,
    tables => VMTable,
    globals => VMGlobal,
    instances => VMInstance,
    memories => VMMemory,
}

/// An isolation domain owning every runtime object created for one
/// linking/execution session.
///
/// Objects are never removed individually; they live until the compartment
/// is dropped. Everything else refers to them through [`CompartmentHandle`]s.
#[derive(Debug, Default)]
pub struct Compartment {
    id: CompartmentId,
    memories: Vec<VMMemory>,
    tables: Vec<VMTable>,
    globals: Vec<VMGlobal>,
    functions: Vec<VMFunction>,
    instances: Vec<VMInstance>,
    errno_location: Option<u32>,
}

impl Compartment {
    /// Creates an empty compartment with a fresh id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID of this compartment.
    pub fn id(&self) -> CompartmentId {
        self.id
    }

    /// Number of objects of kind `T` owned by this compartment.
    pub fn count<T: CompartmentObject>(&self) -> usize {
        T::list(self).len()
    }

    /// Byte address inside the legacy linear memory where the C runtime
    /// keeps `errno`, once the guest has told us.
    pub fn errno_location(&self) -> Option<u32> {
        self.errno_location
    }

    /// Record where the guest keeps `errno`.
    pub fn set_errno_location(&mut self, location: u32) {
        self.errno_location = Some(location);
    }
}

/// Handle to an object owned by a compartment.
///
/// Internally this is just an integer index into the compartment. A
/// reference to the compartment must be passed in separately to access the
/// actual object. A handle does not keep its object alive and owning one
/// grants nothing beyond the ability to look the object up.
pub struct CompartmentHandle<T> {
    id: CompartmentId,
    // Use a NonZero here to reduce the size of Option<CompartmentHandle>.
    idx: NonZeroUsize,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CompartmentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CompartmentHandle<T> {}

impl<T> std::hash::Hash for CompartmentHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.idx.hash(state);
    }
}

impl<T> fmt::Debug for CompartmentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompartmentHandle")
            .field("id", &self.id)
            .field("idx", &self.idx)
            .finish()
    }
}

impl<T> PartialEq for CompartmentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.idx == other.idx
    }
}

impl<T> Eq for CompartmentHandle<T> {}

impl<T: CompartmentObject> CompartmentHandle<T> {
    /// Moves the given object into a compartment and returns a handle to it.
    pub fn new(compartment: &mut Compartment, val: T) -> Self {
        let list = T::list_mut(compartment);
        list.push(val);
        let idx = NonZeroUsize::new(list.len()).unwrap_or(NonZeroUsize::MIN);
        Self {
            id: compartment.id,
            idx,
            marker: PhantomData,
        }
    }

    /// Returns a reference to the object that this handle points to.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different compartment.
    pub fn get<'a>(&self, compartment: &'a Compartment) -> &'a T {
        assert_eq!(
            self.id, compartment.id,
            "object used with the wrong compartment"
        );
        &T::list(compartment)[self.idx.get() - 1]
    }

    /// Returns a mutable reference to the object that this handle points to.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different compartment.
    pub fn get_mut<'a>(&self, compartment: &'a mut Compartment) -> &'a mut T {
        assert_eq!(
            self.id, compartment.id,
            "object used with the wrong compartment"
        );
        &mut T::list_mut(compartment)[self.idx.get() - 1]
    }

    /// Returns the ID of the compartment associated with the handle.
    pub fn compartment_id(&self) -> CompartmentId {
        self.id
    }

    /// Whether this handle may be used with `compartment`.
    pub fn comes_from(&self, compartment: &Compartment) -> bool {
        self.id == compartment.id
    }
}
