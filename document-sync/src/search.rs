//! Search and category filtering over a registry snapshot.

use crate::models::Document;

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or an empty label means no category restriction.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(label.to_string())
        }
    }

    fn matches(&self, doc: &Document) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(wanted) => {
                let wanted = wanted.to_lowercase();
                doc.categories.iter().any(|c| c.to_lowercase() == wanted)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub query: String,
    pub category: CategoryFilter,
}

impl DocumentFilter {
    pub fn new(query: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            query: query.into(),
            category,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.category.matches(doc) && matches_query(doc, &self.query)
    }

    /// Matching documents, in snapshot order.
    pub fn apply(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .filter(|doc| self.matches(doc))
            .cloned()
            .collect()
    }
}

fn matches_query(doc: &Document, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    doc.name.to_lowercase().contains(&query)
        || doc
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains(&query))
        || doc
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&query))
}

/// `"all"` followed by every distinct category label, in first-seen order.
pub fn category_options(documents: &[Document]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    for label in documents.iter().flat_map(|d| d.categories.iter()) {
        if !options.iter().any(|o| o == label) {
            options.push(label.clone());
        }
    }
    options
}
