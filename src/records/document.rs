//! Wire shape of one crawl response document.
//!
//! Every field is optional on the wire: missing keys and explicit `null`
//! both decode to the zero value, and unknown keys are ignored.

use serde::{Deserialize, Deserializer};

use super::{CrawlRecord, RedirectHop};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CrawlDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub result: ResultEnvelope,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResultEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub data: DataEnvelope,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub response: ResponseBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseBody {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub redirects: Vec<RedirectEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub rendered: RenderedBlock,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: StatusBlock,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedirectEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub headers: RedirectHeaders,
    #[serde(deserialize_with = "null_as_default")]
    pub status: StatusBlock,
    #[serde(deserialize_with = "null_as_default")]
    pub redirect_uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RedirectHeaders {
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub connection: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderedBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub screenshot: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusBlock {
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
}

impl From<RedirectEntry> for RedirectHop {
    fn from(entry: RedirectEntry) -> Self {
        Self {
            location: entry.headers.location,
            connection: entry.headers.connection,
            status_code: entry.status.code,
            redirect_uri: entry.redirect_uri,
        }
    }
}

impl From<CrawlDocument> for CrawlRecord {
    fn from(doc: CrawlDocument) -> Self {
        let response = doc.result.data.response;
        Self {
            response_url: response.url,
            title: response.title,
            redirect_chain: response.redirects.into_iter().map(RedirectHop::from).collect(),
            screenshot_ref: response.rendered.screenshot,
            path: response.path,
            status_code: response.status.code,
        }
    }
}
