// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use stock_core::ProductDraft;

use crate::cli::DetailArgs;
use crate::display::{format_mutation, format_product_details};
use crate::error::{Error, Result};
use crate::sync::{Mutation, RemoteApi, SyncManager};

use super::{block_on, load_image, open_session};

pub fn run(offline: bool, name: String, price: f64, details: DetailArgs) -> Result<()> {
    let draft = build_draft(name, price, details)?;
    block_on(async {
        let session = open_session(offline).await?;
        let mutation = run_impl(&session.manager, draft).await?;
        println!("{}", format_mutation("Created", &mutation));
        for line in format_product_details(&mutation.product) {
            println!("{}", line);
        }
        Ok::<(), Error>(())
    })?
}

/// Assemble a draft from command line values, reading the image if given.
pub(crate) fn build_draft(name: String, price: f64, details: DetailArgs) -> Result<ProductDraft> {
    let mut draft = ProductDraft::new(name, price);
    if let Some(description) = details.description {
        draft = draft.with_description(description);
    }
    if let Some(barcode) = details.barcode {
        draft = draft.with_barcode(barcode);
    }
    if let Some(path) = details.image {
        draft = draft.with_image(load_image(&path)?);
    }
    Ok(draft)
}

/// Internal implementation that accepts a manager for testing.
pub(crate) async fn run_impl<R: RemoteApi>(
    manager: &SyncManager<R>,
    draft: ProductDraft,
) -> Result<Mutation> {
    Ok(manager.save_product(draft, None).await?)
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
