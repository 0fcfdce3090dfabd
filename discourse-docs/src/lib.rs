//! discourse-docs - forum topics as an addressable document collection
//!
//! An index topic on the forum lists the pages of a collection in tables
//! under named headings. This crate parses that topic into a URL map,
//! navigation and metadata tables, resolves request paths against the map,
//! and turns content topics into publishable documents.
//!
//! Fetching is abstracted behind [`topic::TopicSource`]; the engine itself
//! performs no network I/O.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod handler;
pub mod html;
pub mod humanize;
pub mod index;
pub mod metadata_table;
pub mod post_process;
pub mod resolve;
pub mod section;
pub mod site_config;
pub mod sitemap;
pub mod topic;
pub mod url_map;

pub use document::Document;
pub use error::{DocumentError, FetchError, PageError, ResolveError};
pub use index::{DocsParser, DocsSnapshot, EngageParser, EngageSnapshot, ParserConfig};
pub use metadata_table::MetadataRecord;
pub use topic::{RawTopic, TopicSource};
pub use url_map::{RedirectMap, UrlMap};
