//! Category affinity, trending categories and personalized ordering.

use crate::models::NewsArticle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ALL_CATEGORIES: &str = "all";

/// Per-user interest in each category label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryScores(HashMap<String, u64>);

impl CategoryScores {
    pub fn score_of(&self, label: &str) -> u64 {
        self.0.get(label).copied().unwrap_or(0)
    }

    /// Add one to every label.
    pub fn bump<S: AsRef<str>>(&mut self, labels: &[S]) {
        for label in labels {
            *self.0.entry(label.as_ref().to_string()).or_insert(0) += 1;
        }
    }

    /// Highest score among the article's categories; 0 when it has none.
    pub fn article_score(&self, article: &NewsArticle) -> u64 {
        article
            .category
            .iter()
            .map(|c| self.score_of(c))
            .max()
            .unwrap_or(0)
    }

    /// Most interesting first. Equal scores keep server order.
    pub fn rank(&self, articles: &mut [NewsArticle]) {
        articles.sort_by_key(|a| std::cmp::Reverse(self.article_score(a)));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendingCategory {
    pub name: String,
    pub count: usize,
}

/// Categories that occur most often across `articles`, ties broken by name.
pub fn trending(articles: &[NewsArticle], limit: usize) -> Vec<TrendingCategory> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in articles.iter().flat_map(|a| a.category.iter()) {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<TrendingCategory> = counts
        .into_iter()
        .map(|(name, count)| TrendingCategory {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// `"all"` followed by every category seen, in first-seen order.
pub fn category_options(articles: &[NewsArticle]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    for label in articles.iter().flat_map(|a| a.category.iter()) {
        if !options.contains(label) {
            options.push(label.clone());
        }
    }
    options
}
