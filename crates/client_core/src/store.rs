use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::{
    domain::{Movie, MovieId, NewMovie},
    protocol::{decode_collection, CreateMovieResponse, RawMovieRecord},
};
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// The system of record for movies. One request per call: no retries, no
/// timeouts beyond the transport's own.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<RawMovieRecord>, StoreError>;
    /// Persists `movie` and returns it with the backend-assigned id.
    async fn create_movie(&self, movie: &NewMovie) -> Result<Movie, StoreError>;
    async fn delete_movie(&self, id: &MovieId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEndpoints {
    list_url: Url,
    store_base_url: Url,
    resource_suffix: String,
}

impl StoreEndpoints {
    pub fn new(
        list_url: impl Into<String>,
        store_base_url: impl Into<String>,
        resource_suffix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let list_url = parse_url(list_url.into())?;
        let store_base_url = parse_url(store_base_url.into())?;
        if store_base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl {
                url: store_base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        Ok(Self {
            list_url,
            store_base_url,
            resource_suffix: resource_suffix.into(),
        })
    }

    pub fn list_url(&self) -> &Url {
        &self.list_url
    }

    pub fn create_url(&self) -> Url {
        self.movies_url(&[&format!("movies{}", self.resource_suffix)])
    }

    /// The id always lands in a single percent-encoded segment under
    /// `movies/`.
    pub fn delete_url(&self, id: &MovieId) -> Result<Url, StoreError> {
        let raw = id.to_string();
        if matches!(raw.as_str(), "" | "." | "..") {
            return Err(StoreError::InvalidMovieId(raw));
        }
        Ok(self.movies_url(&["movies", &format!("{raw}{}", self.resource_suffix)]))
    }

    fn movies_url(&self, segments: &[&str]) -> Url {
        let mut url = self.store_base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Checked in `new`: the base can always carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_url(raw: String) -> Result<Url, StoreError> {
    Url::parse(&raw).map_err(|source| StoreError::InvalidUrl { url: raw, source })
}

pub struct HttpMovieStore {
    http: Client,
    endpoints: StoreEndpoints,
}

impl HttpMovieStore {
    pub fn new(endpoints: StoreEndpoints) -> Self {
        Self {
            http: Client::new(),
            endpoints,
        }
    }
}

fn ensure_success(res: Response) -> Result<Response, StoreError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        url: res.url().to_string(),
    })
}

#[async_trait]
impl MovieStore for HttpMovieStore {
    async fn list_movies(&self) -> Result<Vec<RawMovieRecord>, StoreError> {
        let res = self.http.get(self.endpoints.list_url().clone()).send().await?;
        let body: Value = ensure_success(res)?.json().await?;
        let records = decode_collection(body)?;
        debug!(count = records.len(), "listed movies from remote store");
        Ok(records)
    }

    async fn create_movie(&self, movie: &NewMovie) -> Result<Movie, StoreError> {
        let res = self
            .http
            .post(self.endpoints.create_url())
            .json(movie)
            .send()
            .await?;
        let body: CreateMovieResponse = ensure_success(res)?.json().await?;
        debug!(id = %body.name, "remote store created movie");
        Ok(movie.clone().into_movie(body.name))
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<(), StoreError> {
        let res = self
            .http
            .delete(self.endpoints.delete_url(id)?)
            .send()
            .await?;
        ensure_success(res)?;
        debug!(%id, "remote store deleted movie");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
