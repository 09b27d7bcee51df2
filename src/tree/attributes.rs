//! Ordered attribute storage for element nodes.
//!
//! Attributes keep the order they were first set in. Names are unique and
//! compared ASCII case-insensitively; setting an existing name replaces its
//! value in place and keeps the originally stored spelling.

use crate::error::DomError;

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name as supplied (qualified name, e.g. `"xml:lang"`).
    pub name: String,
    /// The attribute value, entity references already expanded.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a name and a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The attribute list of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStore {
    attrs: Vec<Attribute>,
}

impl AttributeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attrs
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value of the attribute called `name`, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.attrs[i].value.as_str())
    }

    /// Sets `name` to `value`.
    ///
    /// Returns the previous value when the attribute already existed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::InvalidArgument`] for an empty name and
    /// [`DomError::OutOfMemory`] if the list cannot grow.
    pub fn set(&mut self, name: &str, value: &str) -> Result<Option<String>, DomError> {
        if name.is_empty() {
            return Err(DomError::InvalidArgument("attribute name must not be empty"));
        }
        if let Some(i) = self.position(name) {
            let old = std::mem::replace(&mut self.attrs[i].value, value.to_string());
            return Ok(Some(old));
        }
        self.attrs.try_reserve(1)?;
        self.attrs.push(Attribute::new(name, value));
        Ok(None)
    }

    /// Removes the attribute called `name`, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.position(name).map(|i| self.attrs.remove(i))
    }

    /// Returns the attribute at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&Attribute> {
        self.attrs.get(index)
    }

    /// Iterates over the attributes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }

    /// Returns the attributes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Attribute] {
        &self.attrs
    }
}

impl<'a> IntoIterator for &'a AttributeStore {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut attrs = AttributeStore::new();
        assert_eq!(attrs.set("id", "a1"), Ok(None));
        assert_eq!(attrs.set("class", "x"), Ok(None));
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("id"), Some("a1"));
        assert_eq!(attrs.get("missing"), None);
    }

    #[test]
    fn test_lookup_ignores_ascii_case() {
        let mut attrs = AttributeStore::new();
        attrs.set("Href", "a.html").unwrap();
        assert_eq!(attrs.get("HREF"), Some("a.html"));
        assert_eq!(attrs.get("href"), Some("a.html"));
    }

    #[test]
    fn test_set_existing_replaces_in_place() {
        let mut attrs = AttributeStore::new();
        attrs.set("a", "1").unwrap();
        attrs.set("B", "2").unwrap();
        attrs.set("c", "3").unwrap();

        assert_eq!(attrs.set("b", "two"), Ok(Some("2".to_string())));
        assert_eq!(attrs.len(), 3);
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "B", "c"]);
        assert_eq!(attrs.get_index(1).map(|a| a.value.as_str()), Some("two"));
    }

    #[test]
    fn test_remove() {
        let mut attrs = AttributeStore::new();
        attrs.set("a", "1").unwrap();
        attrs.set("b", "2").unwrap();

        let removed = attrs.remove("A").unwrap();
        assert_eq!(removed, Attribute::new("a", "1"));
        assert!(attrs.remove("a").is_none());
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.as_slice()[0].name, "b");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut attrs = AttributeStore::new();
        assert!(matches!(
            attrs.set("", "v"),
            Err(DomError::InvalidArgument(_))
        ));
        assert!(attrs.is_empty());
    }
}
