// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote product API abstraction.
//!
//! Provides a trait-based client for the REST product collection that enables:
//! - Real HTTP calls for production ([`HttpRemote`])
//! - Mock remotes for unit testing
//!
//! Any network error or non-2xx status is returned as a [`RemoteError`]; the
//! client never retries on its own.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stock_core::{Image, Product, ProductDraft};

/// Path of the product collection, relative to the API base URL.
pub const PRODUCTS_PATH: &str = "/api/products";

/// Error type for remote operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Could not reach the server or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used.
    #[error("invalid API url '{0}'")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteApi`] methods.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// The product collection endpoint.
///
/// This trait abstracts over the HTTP client, allowing the sync manager to be
/// exercised against in-memory mock implementations.
pub trait RemoteApi: Send + Sync {
    /// `GET /api/products`
    fn list(&self) -> RemoteFuture<'_, Vec<Product>>;

    /// `POST /api/products`; returns the created product with its server id.
    fn create<'a>(&'a self, draft: &'a ProductDraft) -> RemoteFuture<'a, Product>;

    /// `PUT /api/products/{id}`.
    ///
    /// Returns `None` when the server accepted the update without echoing the
    /// product back.
    fn update<'a>(&'a self, id: i64, draft: &'a ProductDraft)
        -> RemoteFuture<'a, Option<Product>>;

    /// `DELETE /api/products/{id}`
    fn delete(&self, id: i64) -> RemoteFuture<'_, ()>;
}

/// Response body as either a bare value or a `{ "data": ... }` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// Decode a response body, unwrapping a `data` envelope when present.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> RemoteResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

/// A single multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

/// Multipart fields sent for a create or update, in wire order.
///
/// `name` and `price` are always present; the optional fields only when set.
/// An already-uploaded image is sent back as its URL.
pub fn form_fields(draft: &ProductDraft) -> Vec<(&'static str, FormValue)> {
    let mut fields = vec![
        ("name", FormValue::Text(draft.name.clone())),
        ("price", FormValue::Text(draft.price.to_string())),
    ];
    if let Some(description) = &draft.description {
        fields.push(("description", FormValue::Text(description.clone())));
    }
    if let Some(barcode) = &draft.barcode {
        fields.push(("barcode", FormValue::Text(barcode.clone())));
    }
    match &draft.image {
        Image::Unset => {}
        Image::Uploaded { url } => fields.push(("image", FormValue::Text(url.clone()))),
        Image::PendingUpload {
            bytes,
            filename,
            mime_type,
        } => fields.push((
            "image",
            FormValue::File {
                bytes: bytes.clone(),
                filename: filename.clone(),
                mime_type: mime_type.clone(),
            },
        )),
    }
    fields
}

fn product_form(draft: &ProductDraft) -> RemoteResult<Form> {
    let mut form = Form::new();
    for (name, value) in form_fields(draft) {
        form = match value {
            FormValue::Text(text) => form.text(name, text),
            FormValue::File {
                bytes,
                filename,
                mime_type,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&mime_type)
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

/// Host and port the API lives on, for connectivity probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Parse an API base URL: http(s) with a host, trailing slash dropped.
pub fn parse_base_url(base_url: &str) -> RemoteResult<Url> {
    let invalid = || RemoteError::InvalidUrl(base_url.to_string());
    let base = Url::parse(base_url.trim_end_matches('/')).map_err(|_| invalid())?;
    if !matches!(base.scheme(), "http" | "https")
        || base.cannot_be_a_base()
        || base.host_str().is_none()
    {
        return Err(invalid());
    }
    Ok(base)
}

/// REST implementation of [`RemoteApi`] using reqwest.
pub struct HttpRemote {
    client: Client,
    base: Url,
}

impl HttpRemote {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpRemote { client, base })
    }

    /// Where the API is served from.
    pub fn endpoint(&self) -> RemoteResult<Endpoint> {
        let host = self
            .base
            .host_str()
            .ok_or_else(|| RemoteError::InvalidUrl(self.base.to_string()))?;
        let port = self
            .base
            .port_or_known_default()
            .ok_or_else(|| RemoteError::InvalidUrl(self.base.to_string()))?;
        Ok(Endpoint {
            host: host.to_string(),
            port,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), PRODUCTS_PATH)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.collection_url(), id)
    }
}

/// Read the body of a successful response, or turn a failure status into an error.
async fn read_body(response: reqwest::Response) -> RemoteResult<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok((status, body))
}

impl RemoteApi for HttpRemote {
    fn list(&self) -> RemoteFuture<'_, Vec<Product>> {
        Box::pin(async move {
            let response = self.client.get(self.collection_url()).send().await?;
            let (_, body) = read_body(response).await?;
            decode_body(&body)
        })
    }

    fn create<'a>(&'a self, draft: &'a ProductDraft) -> RemoteFuture<'a, Product> {
        Box::pin(async move {
            let form = product_form(draft)?;
            let response = self
                .client
                .post(self.collection_url())
                .multipart(form)
                .send()
                .await?;
            let (_, body) = read_body(response).await?;
            decode_body(&body)
        })
    }

    fn update<'a>(
        &'a self,
        id: i64,
        draft: &'a ProductDraft,
    ) -> RemoteFuture<'a, Option<Product>> {
        Box::pin(async move {
            let form = product_form(draft)?;
            let response = self
                .client
                .put(self.item_url(id))
                .multipart(form)
                .send()
                .await?;
            let (status, body) = read_body(response).await?;
            if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
                return Ok(None);
            }
            decode_body(&body).map(Some)
        })
    }

    fn delete(&self, id: i64) -> RemoteFuture<'_, ()> {
        Box::pin(async move {
            let response = self.client.delete(self.item_url(id)).send().await?;
            read_body(response).await?;
            Ok(())
        })
    }
}
