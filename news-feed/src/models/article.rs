use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_READ_TIME_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    #[serde(other)]
    Unknown,
}

/// One article as stored by the news backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category labels; the backend sends either a list or a single string.
    #[serde(
        default,
        alias = "categories",
        deserialize_with = "one_or_many"
    )]
    pub category: Vec<String>,
    #[serde(default, alias = "imageUrl", alias = "image_url")]
    pub image: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "date")]
    pub published: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default, alias = "readTime")]
    pub read_time: Option<u32>,
}

impl NewsArticle {
    pub fn read_time_minutes(&self) -> u32 {
        self.read_time.unwrap_or(DEFAULT_READ_TIME_MINUTES)
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.category.iter().any(|c| c == label)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Missing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(label) if label.trim().is_empty() => Vec::new(),
        OneOrMany::One(label) => vec![label],
        OneOrMany::Many(labels) => labels,
        OneOrMany::Missing(()) => Vec::new(),
    })
}
