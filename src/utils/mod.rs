//! Shared helpers: dates, HTML escaping, MIME types.

pub mod date;
pub mod html;
pub mod mime;
