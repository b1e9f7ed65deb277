use std::io;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use itertools::Itertools;
use log::info;

use crate::catalog::{Catalog, PLAYLISTS_URL, RESOURCES};

fn launch(what: &str, url: &str, open: impl FnOnce(&str) -> io::Result<()>) -> Result<()> {
    println!("{} {what}", "Opening".green().bold());
    println!("  {}", url.dimmed());
    info!("opening {url}");
    open(url).with_context(|| format!("Failed to open {what}"))
}

/// `cali open <resource>`
pub fn resource(name: &str, open: impl FnOnce(&str) -> io::Result<()>) -> Result<()> {
    let Some((key, url)) = RESOURCES.iter().find(|(k, _)| k.eq_ignore_ascii_case(name.trim())) else {
        bail!(
            "unknown resource {name:?} (available: {})",
            RESOURCES.iter().map(|(k, _)| k).join(", ")
        );
    };
    launch(key, url, open)
}

pub fn playlists(open: impl FnOnce(&str) -> io::Result<()>) -> Result<()> {
    launch("playlists", PLAYLISTS_URL, open)
}

/// `cali tutorial <exercise> <level>`, words may be split or quoted freely.
pub fn tutorial(
    catalog: &Catalog,
    words: &[String],
    open: impl FnOnce(&str) -> io::Result<()>,
) -> Result<()> {
    let (exercise, level) = catalog.split_exercise_level(words)?;

    let Some(url) = catalog.resolve_tutorial(exercise, level) else {
        bail!("no tutorial link for {exercise} - {level}");
    };
    launch(&format!("tutorial for {exercise} - {level}"), url, open)
}
