// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Product records and their user-editable drafts.
//!
//! Server-assigned ids are positive. A product created locally and not yet
//! synced carries a negative placeholder id (see [`temp_id`]) until the server
//! answers with the real one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Product image.
///
/// Either nothing, a URL the server already stores, or file contents that
/// still have to be uploaded with the next create/update call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Image {
    #[default]
    Unset,
    Uploaded {
        url: String,
    },
    PendingUpload {
        bytes: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

impl Image {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Image::Uploaded { url: url.into() }
    }

    pub fn pending_upload(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Image::PendingUpload {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Image::Unset)
    }

    /// URL of an uploaded image, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Image::Uploaded { url } => Some(url),
            _ => None,
        }
    }
}

/// Wire form of [`Image`]: a nullable URL string.
///
/// Pending uploads have no URL yet and serialize as `null`.
mod image_wire {
    use super::Image;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(image: &Image, serializer: S) -> Result<S::Ok, S::Error> {
        match image.url() {
            Some(url) => serializer.serialize_some(url),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Image, D::Error> {
        let url: Option<String> = Option::deserialize(deserializer)?;
        Ok(match url {
            Some(url) if !url.trim().is_empty() => Image::Uploaded { url },
            _ => Image::Unset,
        })
    }
}

/// The server sends `""` for a product without barcode.
fn blank_as_none<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// User-supplied product fields, without an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub image: Image,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        ProductDraft {
            name: name.into(),
            price,
            description: None,
            barcode: None,
            image: Image::Unset,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    pub fn with_image(mut self, image: Image) -> Self {
        self.image = image;
        self
    }

    /// Checks the draft and returns it with the name trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty name or a price that is not a
    /// finite number greater than zero.
    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: "name",
                reason: "cannot be empty",
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::Validation {
                field: "price",
                reason: "must be greater than 0",
            });
        }
        self.name = trimmed.to_string();
        self.description = self.description.filter(|d| !d.trim().is_empty());
        self.barcode = self
            .barcode
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());
        Ok(self)
    }
}

/// A product as cached locally and as exchanged with the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProductWire")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(serialize_with = "image_wire::serialize")]
    pub image: Image,
}

/// Server representation of a product.
///
/// The image may come as `image`, `imageUrl` or both; a non-empty `image`
/// wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductWire {
    id: i64,
    name: String,
    price: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    barcode: Option<String>,
    #[serde(default, deserialize_with = "image_wire::deserialize")]
    image: Image,
    #[serde(default, deserialize_with = "image_wire::deserialize")]
    image_url: Image,
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        let image = if wire.image.is_unset() {
            wire.image_url
        } else {
            wire.image
        };
        Product {
            id: wire.id,
            name: wire.name,
            price: wire.price,
            description: wire.description,
            barcode: wire.barcode,
            image,
        }
    }
}

impl Product {
    pub fn with_id(id: i64, draft: ProductDraft) -> Self {
        Product {
            id,
            name: draft.name,
            price: draft.price,
            description: draft.description,
            barcode: draft.barcode,
            image: draft.image,
        }
    }

    /// Returns the fields sent to the server, without the id.
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft {
            name: self.name.clone(),
            price: self.price,
            description: self.description.clone(),
            barcode: self.barcode.clone(),
            image: self.image.clone(),
        }
    }

    /// True while the product only exists locally.
    pub fn is_local_only(&self) -> bool {
        is_temp_id(self.id)
    }

    /// Search-box matching: name (case-insensitive), id, price or barcode
    /// containing `query`. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q)
            || self.id.to_string().contains(&q)
            || self.price.to_string().contains(&q)
            || self.barcode.as_deref().is_some_and(|b| b.contains(&q))
    }
}

/// Placeholder id for a product created at `now` that the server has not seen.
pub fn temp_id(now: DateTime<Utc>) -> i64 {
    -now.timestamp_millis().max(1)
}

/// Returns true for ids that were assigned locally.
pub fn is_temp_id(id: i64) -> bool {
    id < 0
}

/// Field used to order product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    Price,
}

/// Sorts products in place by `key`, descending when `desc` is set.
pub fn sort_products(products: &mut [Product], key: SortKey, desc: bool) {
    products.sort_by(|a, b| {
        let ord = match key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Price => a.price.total_cmp(&b.price),
        };
        if desc {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// One page of a listing plus the numbers needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slices `items` into the 1-based `page` of size `per_page`.
///
/// Pages past the end come back empty; `per_page` of zero is treated as one.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);
    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages,
    }
}

#[cfg(test)]
#[path = "product_tests.rs"]
mod tests;
