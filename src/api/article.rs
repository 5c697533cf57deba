//! Article extraction request options and response model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fetch::Params;

/// Optional knobs for the article endpoint
#[derive(Debug, Clone)]
pub struct ArticleOptions {
    /// Response format; only sent when not `json`
    pub format: String,
    /// Ask for comment extraction
    pub comments: bool,
    /// Ask for timing/statistics data
    pub stats: bool,
    /// Keep the raw response body on the returned article
    pub keep_raw_response: bool,
}

impl Default for ArticleOptions {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            comments: false,
            stats: false,
            keep_raw_response: false,
        }
    }
}

impl ArticleOptions {
    /// Adds the non-default options to a request's parameters
    pub(crate) fn apply(&self, params: &mut Params) {
        if self.format != "json" {
            params.insert("format".to_string(), self.format.clone());
        }
        if self.comments {
            params.insert("comments".to_string(), "true".to_string());
        }
        if self.stats {
            params.insert("stats".to_string(), "true".to_string());
        }
    }
}

/// An extracted article
///
/// Only the commonly used fields are typed; everything else the API returns
/// is preserved in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Article {
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub xpath: Option<String>,
    /// Tags assigned by the API; empty when the response has none
    #[serde(default)]
    pub tags: Vec<String>,
    /// Raw response body, when requested via `ArticleOptions::keep_raw_response`
    #[serde(default, skip_deserializing)]
    pub raw_response: String,
    /// Remaining response fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Decodes a JSON response body
    pub fn from_response(body: &str, keep_raw_response: bool) -> Result<Self, serde_json::Error> {
        let mut article: Article = serde_json::from_str(body)?;
        // Reserved for the local copy; a same-named API field would serialize twice
        article.extra.remove("raw_response");
        if keep_raw_response {
            article.raw_response = body.to_string();
        }
        Ok(article)
    }
}
