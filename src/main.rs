//! mkcontext: snapshot a project directory into an LLM-friendly context document
//!
//! Walks a project tree with gitignore-style filtering, embeds a checksum
//! manifest into the rendered document, and skips regeneration when nothing
//! changed since the previous run.

use anyhow::Result;

mod cli;
mod collect;
mod config;
mod error;
mod ignore;
mod manifest;
mod render;
mod utils;

fn main() -> Result<()> {
    cli::run()
}
