//! DTOs for decoding MediaWiki action API responses.
//!
//! All requests use `formatversion=2`, so `pages` is an array and boolean
//! flags such as `missing` are real booleans.

use super::{Image, Reference, SourceError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Continuation parameters echoed back on the next request
pub type Continuation = BTreeMap<String, String>;

#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub query: Option<QueryDto>,
    #[serde(default)]
    pub parse: Option<ParseDto>,
    #[serde(default, rename = "continue")]
    pub continuation: Option<Continuation>,
    #[serde(default)]
    pub error: Option<ApiErrorDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryDto {
    #[serde(default)]
    pub pages: Vec<PageDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageDto {
    pub pageid: Option<u64>,
    pub title: Option<String>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    pub extract: Option<String>,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfoDto>,
    #[serde(default)]
    pub extlinks: Vec<ExtlinkDto>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfoDto {
    pub url: Option<String>,
    pub descriptionurl: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtlinkDto {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseDto {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDto {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl ApiResponse {
    /// Decode a raw body, turning an API `error` object into `SourceError::Api`.
    pub fn decode(body: &[u8]) -> Result<Self, SourceError> {
        let response: ApiResponse = serde_json::from_slice(body)
            .map_err(|e| SourceError::Decode(format!("invalid MediaWiki JSON payload: {}", e)))?;
        match response.error {
            Some(error) => Err(SourceError::Api {
                code: error.code,
                info: error.info,
            }),
            None => Ok(response),
        }
    }

    /// The single page a `pageids=` / `titles=` query targets
    pub fn first_page(self) -> Option<PageDto> {
        self.query.and_then(|q| q.pages.into_iter().next())
    }

    /// Images listed by a `generator=images` batch.
    ///
    /// Files without image info (e.g. deleted uploads) are skipped.
    pub fn images(&self) -> Vec<Image> {
        self.pages()
            .filter_map(|page| {
                let title = page.title.clone().unwrap_or_default();
                let Some(url) = page.imageinfo.first().and_then(|info| info.url.clone()) else {
                    tracing::debug!(file = %title, "skipping image without a url");
                    return None;
                };
                let description_url = page
                    .imageinfo
                    .first()
                    .and_then(|info| info.descriptionurl.clone())
                    .unwrap_or_default();
                Some(Image { url, title, description_url })
            })
            .collect()
    }

    /// External links listed by a `prop=extlinks` batch
    pub fn references(&self) -> Vec<Reference> {
        self.pages()
            .flat_map(|page| page.extlinks.iter())
            .map(|link| Reference::new(link.url.clone()))
            .collect()
    }

    fn pages(&self) -> impl Iterator<Item = &PageDto> {
        self.query.iter().flat_map(|q| q.pages.iter())
    }
}

impl PageDto {
    /// Whether the lookup resolved to an existing page
    pub fn exists(&self) -> bool {
        !self.missing && !self.invalid && self.pageid.is_some()
    }
}
