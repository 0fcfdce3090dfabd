//! discourse-docs - serve forum topics as a documentation collection
//!
//! Reads topics saved as `{id}.json` files, parses the index topic and
//! answers path lookups the way the web handlers do.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use discourse_docs::handler::{self, Outcome};
use discourse_docs::index::{DocsParser, EngageParser};
use discourse_docs::site_config::{SiteConfig, Variant};
use discourse_docs::sitemap;
use discourse_docs::topic::DirectorySource;
use discourse_docs::url_map::UrlMap;
use discourse_docs::Document;
use std::path::Path;

/// Main entry point for the discourse-docs CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// A parser for whichever variant the configuration names
enum Site {
    Docs(DocsParser<DirectorySource>),
    Engage(EngageParser<DirectorySource>),
}

impl Site {
    fn open(config_path: &Path) -> Result<Self> {
        let config = SiteConfig::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        let topics_dir = config.topics_dir_from(config_dir);
        log::info!("Reading topics from {}", topics_dir.display());

        let source = DirectorySource::new(topics_dir);
        let parser_config = config.parser_config();

        Ok(match config.variant {
            Variant::Docs => Site::Docs(DocsParser::new(source, parser_config)),
            Variant::Engage => Site::Engage(EngageParser::new(source, parser_config)),
        })
    }

    fn source(&self) -> &DirectorySource {
        match self {
            Site::Docs(parser) => parser.source(),
            Site::Engage(parser) => parser.source(),
        }
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::init();
    }

    let site = Site::open(&cli.config)?;

    match cli.command {
        Commands::Parse { json } => handle_parse_command(&site, json)?,
        Commands::Resolve { path, preview } => handle_resolve_command(&site, &path, preview)?,
        Commands::Sitemap { host, xml } => handle_sitemap_command(&site, &host, xml)?,
    }

    Ok(())
}

/// Handle the parse command
fn handle_parse_command(site: &Site, json: bool) -> Result<()> {
    match site {
        Site::Docs(parser) => {
            let snapshot = parser.parse().context("Failed to parse the index topic")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&*snapshot)?);
                return Ok(());
            }

            print_url_map(&snapshot.url_map);
            println!("\nRedirects ({}):", snapshot.redirects.len());
            for (from, to) in snapshot.redirects.iter() {
                println!("  {} -> {}", from, to);
            }
            println!("\nNavigation: {} bytes", snapshot.navigation.len());
            print_warnings(&snapshot.warnings);
        }
        Site::Engage(parser) => {
            let snapshot = parser.parse().context("Failed to parse the index topic")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&*snapshot)?);
                return Ok(());
            }

            print_url_map(&snapshot.url_map);
            println!("\nPages: {}", snapshot.metadata.len());
            println!("Takeovers: {}", snapshot.takeovers.len());
            print_warnings(&snapshot.warnings);
        }
    }

    Ok(())
}

/// Handle the resolve command
fn handle_resolve_command(site: &Site, path: &str, preview: bool) -> Result<()> {
    let outcome = match site {
        Site::Docs(parser) => handler::docs_outcome(parser, path),
        Site::Engage(parser) => handler::engage_outcome(parser, path, preview),
    }
    .with_context(|| format!("Failed to answer {}", path))?;

    match outcome {
        Outcome::Render(document) => print_document(&document),
        Outcome::Redirect(target) => println!("Redirect: {}", target),
        Outcome::NotFound => println!("Not found: {}", path),
    }

    Ok(())
}

/// Handle the sitemap command
fn handle_sitemap_command(site: &Site, host: &str, xml: bool) -> Result<()> {
    let url_map = match site {
        Site::Docs(parser) => parser.parse()?.url_map.clone(),
        Site::Engage(parser) => parser.parse()?.url_map.clone(),
    };

    if xml {
        let pages = sitemap::sitemap_pages(host, &url_map, site.source());
        print!("{}", sitemap::sitemap_xml(&pages));
    } else {
        println!("{}", sitemap::sitemap_text(host, &url_map));
    }

    Ok(())
}

/// Print URL map entries in table order
fn print_url_map(url_map: &UrlMap) {
    println!("URL map ({} paths):", url_map.len());
    for (path, topic_id) in url_map.paths() {
        println!("  {} -> {}", path, topic_id);
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        println!("\n✓ No warnings");
        return;
    }

    println!("\nWarnings ({}):", warnings.len());
    for warning in warnings {
        println!("  {}", warning);
    }
}

/// Print a rendered document
fn print_document(document: &Document) {
    println!("Title: {}", document.title);
    println!("Topic: {}", document.topic_path);
    println!("Updated: {}", document.updated);
    if let Some(ref metadata) = document.metadata {
        for (column, value) in metadata.fields() {
            println!("  {}: {}", column, value);
        }
    }
    if !document.related.is_empty() {
        println!("Related: {}", document.related.len());
    }
    for warning in &document.warnings {
        println!("Warning: {}", warning);
    }
    println!("\n{}", document.body_html);
}
