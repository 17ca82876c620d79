//! `inspect` and `views` commands.

use anyhow::Result;
use serde::Serialize;

use super::common::Site;
use crate::view::{ViewGroup, ViewMetadata, ViewRegistry};

/// Print everything `view` derives for `page`, as JSON.
pub fn inspect_page(site: &Site, page: &str, view: &str) -> Result<()> {
    let view = site.view(view)?;
    let page = site.page(page)?;
    let metadata = ViewMetadata::collect(view.as_ref(), &site.ctx(), &page)?;
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ViewEntry {
    name: &'static str,
    display: &'static str,
    group: ViewGroup,
}

/// Print the registered views, one JSON object per line.
pub fn list_views(registry: &ViewRegistry) -> Result<()> {
    for view in registry.views() {
        let entry = ViewEntry {
            name: view.name(),
            display: view.display(),
            group: view.group(),
        };
        println!("{}", serde_json::to_string(&entry)?);
    }
    Ok(())
}
