// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use stock_core::{Product, ProductDraft};

use crate::cli::DetailArgs;
use crate::display::{format_mutation, format_product_details};
use crate::error::{Error, Result};
use crate::sync::{Mutation, RemoteApi, SyncManager};

use super::{block_on, load_image, open_session};

/// Field changes requested on the command line; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct Changes {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub details: DetailArgs,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.details.description.is_none()
            && self.details.barcode.is_none()
            && self.details.image.is_none()
    }
}

pub fn run(offline: bool, id: i64, changes: Changes) -> Result<()> {
    if changes.is_empty() {
        return Err(Error::NothingToEdit);
    }
    block_on(async {
        let session = open_session(offline).await?;
        let mutation = run_impl(&session.manager, id, changes).await?;
        println!("{}", format_mutation("Updated", &mutation));
        for line in format_product_details(&mutation.product) {
            println!("{}", line);
        }
        Ok::<(), Error>(())
    })?
}

/// Merge `changes` into the stored product's fields.
pub(crate) fn apply_changes(existing: &Product, changes: Changes) -> Result<ProductDraft> {
    if changes.is_empty() {
        return Err(Error::NothingToEdit);
    }
    let mut draft = existing.to_draft();
    if let Some(name) = changes.name {
        draft.name = name;
    }
    if let Some(price) = changes.price {
        draft.price = price;
    }
    if let Some(description) = changes.details.description {
        draft.description = Some(description);
    }
    if let Some(barcode) = changes.details.barcode {
        draft.barcode = Some(barcode);
    }
    if let Some(path) = changes.details.image {
        draft.image = load_image(&path)?;
    }
    Ok(draft)
}

/// Internal implementation that accepts a manager for testing.
pub(crate) async fn run_impl<R: RemoteApi>(
    manager: &SyncManager<R>,
    id: i64,
    changes: Changes,
) -> Result<Mutation> {
    let existing = manager.store().require_product(id)?;
    let draft = apply_changes(&existing, changes)?;
    Ok(manager.save_product(draft, Some(id)).await?)
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
