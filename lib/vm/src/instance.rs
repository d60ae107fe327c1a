use crate::Extern;
use indexmap::IndexMap;

/// An instantiated module as seen from the linker: a name and the ordered
/// set of objects it exports.
#[derive(Debug, Clone, Default)]
pub struct VMInstance {
    name: String,
    exports: IndexMap<String, Extern>,
}

impl VMInstance {
    /// Create an instance from its exports.
    pub fn new(name: impl Into<String>, exports: IndexMap<String, Extern>) -> Self {
        Self {
            name: name.into(),
            exports,
        }
    }

    /// The debug name the instance was created under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an export by name.
    pub fn get_export(&self, name: &str) -> Option<&Extern> {
        self.exports.get(name)
    }

    /// Iterate over the exports in definition order.
    pub fn exports(&self) -> impl Iterator<Item = (&str, &Extern)> {
        self.exports.iter().map(|(name, ext)| (name.as_str(), ext))
    }

    /// Number of exports.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the instance exports nothing.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}
