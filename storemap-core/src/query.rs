//! Search input normalisation

/// Trim surrounding whitespace and lowercase
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Effective search query derived from the two search inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Free text wins when it is non-empty after normalisation,
    /// otherwise the selector value is used (which may be empty too).
    pub fn from_inputs(text: &str, selection: &str) -> Self {
        let text = normalize(text);
        if !text.is_empty() {
            Query(text)
        } else {
            Query(normalize(selection))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw values of the search field and the category selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInputs {
    pub text: String,
    pub selection: String,
}

impl SearchInputs {
    pub fn new(text: impl Into<String>, selection: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: selection.into(),
        }
    }

    pub fn query(&self) -> Query {
        Query::from_inputs(&self.text, &self.selection)
    }
}
