//! Fixed vocabulary mapping search categories to section mesh names

use crate::error::{Error, Result};
use crate::query::normalize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The store departments and the section mesh each one lives in
pub const DEFAULT_CATEGORIES: [(&str, &str); 9] = [
    ("games", "Cube001"),
    ("beauty", "Cube002"),
    ("medical", "Cube003"),
    ("sports", "Cube004"),
    ("grocery", "Cube005"),
    ("furniture", "Cube006"),
    ("electronics", "Cube007"),
    ("hardware", "Cube008"),
    ("stationery", "Cube009"),
];

/// One category entry as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: String,
    pub node: String,
}

impl CategoryEntry {
    pub fn new(category: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            node: node.into(),
        }
    }
}

/// Ordered, read-only mapping from normalised category to node name
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    entries: Vec<CategoryEntry>,
    lookup: HashMap<String, usize>,
}

impl CategoryTable {
    /// Build a table, normalising every category key.
    ///
    /// Fails if two entries normalise to the same category or a key is empty.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = CategoryEntry>,
    {
        let mut table = Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
        };
        for entry in entries {
            let category = normalize(&entry.category);
            if category.is_empty() {
                return Err(Error::Config(format!(
                    "empty category name for node {}",
                    entry.node
                )));
            }
            if table.lookup.contains_key(&category) {
                return Err(Error::Config(format!("duplicate category: {}", category)));
            }
            table.lookup.insert(category.clone(), table.entries.len());
            table.entries.push(CategoryEntry::new(category, entry.node));
        }
        Ok(table)
    }

    /// Look up the node name for an already normalised category
    pub fn lookup(&self, category: &str) -> Option<&str> {
        self.lookup
            .get(category)
            .map(|&i| self.entries[i].node.as_str())
    }

    /// Categories in table order, for populating a selector
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.category.as_str())
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let entries = DEFAULT_CATEGORIES
            .iter()
            .map(|(category, node)| CategoryEntry::new(*category, *node));
        let mut table = Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
        };
        for entry in entries {
            table.lookup.insert(entry.category.clone(), table.entries.len());
            table.entries.push(entry);
        }
        table
    }
}

/// The default table as configuration entries
pub fn default_category_entries() -> Vec<CategoryEntry> {
    CategoryTable::default().entries().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_matches_store_layout() {
        let table = CategoryTable::default();
        assert_eq!(table.len(), 9);
        assert_eq!(table.lookup("games"), Some("Cube001"));
        assert_eq!(table.lookup("stationery"), Some("Cube009"));
        assert_eq!(table.lookup("toys"), None);
    }

    #[test]
    fn test_categories_keep_table_order() {
        let table = CategoryTable::default();
        let categories: Vec<_> = table.categories().collect();
        assert_eq!(categories.first(), Some(&"games"));
        assert_eq!(categories.last(), Some(&"stationery"));
    }

    #[test]
    fn test_keys_are_normalised_on_construction() {
        let table = CategoryTable::from_entries(vec![CategoryEntry::new("  Garden ", "Cube010")])
            .unwrap();
        assert_eq!(table.lookup("garden"), Some("Cube010"));
        assert_eq!(table.lookup("  Garden "), None);
    }

    #[test]
    fn test_duplicate_categories_are_rejected() {
        let result = CategoryTable::from_entries(vec![
            CategoryEntry::new("games", "Cube001"),
            CategoryEntry::new("GAMES", "Cube002"),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_category_is_rejected() {
        let result = CategoryTable::from_entries(vec![CategoryEntry::new("   ", "Cube001")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_entries_equals_default_for_default_entries() {
        let table = CategoryTable::from_entries(default_category_entries()).unwrap();
        assert_eq!(table, CategoryTable::default());
    }
}
