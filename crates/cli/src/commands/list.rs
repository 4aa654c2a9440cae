// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use stock_core::{paginate, sort_products, Database, Page, Product, SortKey};

use crate::cli::OutputFormat;
use crate::display::format_product_page;
use crate::error::Result;

use super::open_db;

/// Filters and paging for a product listing.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: Option<String>,
    pub barcode: Option<String>,
    pub sort: SortKey,
    pub desc: bool,
    pub page: usize,
    pub per_page: usize,
}

pub fn run(options: &ListOptions, output: OutputFormat) -> Result<()> {
    let (db, _, _) = open_db()?;
    let page = run_impl(&db, options)?;

    match output {
        OutputFormat::Text => {
            for line in format_product_page(&page) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
    }
    Ok(())
}

/// Internal implementation that accepts db for testing.
pub(crate) fn run_impl(db: &Database, options: &ListOptions) -> Result<Page<Product>> {
    let mut products = match &options.barcode {
        Some(code) => db.find_by_barcode(code)?.into_iter().collect(),
        None => db.search_products(options.query.as_deref().unwrap_or(""))?,
    };
    sort_products(&mut products, options.sort, options.desc);
    Ok(paginate(&products, options.page, options.per_page))
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
