// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use stock_core::{Image, Page, PendingOperation, Product};

use crate::sync::{Mutation, MutationStatus, RefreshOutcome, SyncOutcome};

/// Maximum characters of a product name shown in a table row.
const NAME_WIDTH: usize = 32;

/// Format a price with two decimals.
pub fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

/// Cut `text` to `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// Short label for an image cell.
fn image_label(image: &Image) -> &str {
    match image {
        Image::Unset => "",
        Image::Uploaded { url } => url,
        Image::PendingUpload { filename, .. } => filename,
    }
}

/// Format one product for lists: `[id] name  price  barcode`.
///
/// Products the server has not seen yet are marked `(local)`.
pub fn format_product_line(product: &Product) -> String {
    let mut line = format!(
        "[{}] {}  {}",
        product.id,
        truncate(&product.name, NAME_WIDTH),
        format_price(product.price)
    );
    if let Some(barcode) = &product.barcode {
        line.push_str("  #");
        line.push_str(barcode);
    }
    if product.is_local_only() {
        line.push_str("  (local)");
    }
    line
}

/// Format a page of products with a pager footer.
pub fn format_product_page(page: &Page<Product>) -> Vec<String> {
    if page.total == 0 {
        return vec!["No products found.".to_string()];
    }

    let mut lines: Vec<String> = page.items.iter().map(format_product_line).collect();
    lines.push(format!(
        "Page {} of {} ({} products)",
        page.page, page.total_pages, page.total
    ));
    lines
}

/// Format a product with every field, one per line.
pub fn format_product_details(product: &Product) -> Vec<String> {
    let mut lines = vec![format_product_line(product)];
    if let Some(description) = &product.description {
        lines.push(format!("  Description: {}", description));
    }
    let image = image_label(&product.image);
    if !image.is_empty() {
        lines.push(format!("  Image: {}", image));
    }
    lines
}

/// Format a queued operation: `#seq  type  [product id] name  queued_at`.
pub fn format_operation(op: &PendingOperation) -> String {
    let target = if op.product.name.is_empty() {
        format!("[{}]", op.product_id())
    } else {
        format!("[{}] {}", op.product_id(), truncate(&op.product.name, NAME_WIDTH))
    };
    format!(
        "#{}  {:<6}  {}  {}",
        op.id,
        op.op_type.as_str(),
        target,
        op.queued_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// One-line result of a save or delete.
pub fn format_mutation(verb: &str, mutation: &Mutation) -> String {
    let subject = format!("product {}", mutation.product.id);
    match mutation.status {
        MutationStatus::Synced => format!("{} {}", verb, subject),
        MutationStatus::Queued => {
            format!("{} {} locally (offline, queued for sync)", verb, subject)
        }
        MutationStatus::LocalOnly => format!("{} {} locally (never synced)", verb, subject),
    }
}

/// Summary lines for a finished `stock sync`.
pub fn format_sync_outcome(outcome: &SyncOutcome, pending: usize) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome {
        SyncOutcome::Skipped => lines.push("Sync already in progress.".to_string()),
        SyncOutcome::Offline => lines.push("Offline: nothing sent.".to_string()),
        SyncOutcome::Completed(report) => {
            lines.push(format!(
                "Replayed {} of {} operations ({} failed, {} deferred).",
                report.succeeded, report.attempted, report.failed, report.deferred
            ));
            lines.push(match report.refresh {
                RefreshOutcome::Refreshed(n) => format!("Refreshed {} products.", n),
                RefreshOutcome::SkippedOffline => "Refresh skipped: offline.".to_string(),
                RefreshOutcome::Failed => "Refresh failed: kept local products.".to_string(),
            });
        }
    }
    if pending > 0 {
        lines.push(format!("{} operations still pending.", pending));
    }
    lines
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
