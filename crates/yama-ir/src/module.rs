//! An insertion-ordered association from unqualified name to type
//! description. Construction enforces uniqueness; equality is structural.

use crate::{TypeDescription, UnqualifiedName};
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDescription {
    types: IndexMap<String, TypeDescription>,
}

impl ModuleDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and does not insert) if `name` is already present.
    #[must_use]
    pub fn insert(&mut self, name: UnqualifiedName, desc: TypeDescription) -> bool {
        let key = name.to_string();
        if self.types.contains_key(&key) {
            return false;
        }
        self.types.insert(key, desc);
        true
    }

    pub fn get(&self, name: &UnqualifiedName) -> Option<&TypeDescription> {
        self.types.get(&name.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescription)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstTable, PrimitiveTag};

    #[test]
    fn insert_rejects_duplicate_names() {
        let mut m = ModuleDescription::new();
        let name = UnqualifiedName::parse("Int").unwrap();
        let desc = TypeDescription::new_primitive(name.clone(), ConstTable::new(), PrimitiveTag::Int);
        assert!(m.insert(name.clone(), desc.clone()));
        assert!(!m.insert(name, desc));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn preserves_insertion_order() {
        let mut m = ModuleDescription::new();
        for n in ["c", "a", "b"] {
            let name = UnqualifiedName::parse(n).unwrap();
            let desc = TypeDescription::new_primitive(name.clone(), ConstTable::new(), PrimitiveTag::Int);
            assert!(m.insert(name, desc));
        }
        let order: Vec<&str> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
