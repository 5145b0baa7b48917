use crate::cli::Cli;
use crate::extractor::ExtractionResult;
use crate::preview::Previewer;
use crate::render::{self, PreviewState};
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Counts reported once every page has been previewed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub pages: usize,
    pub with_content: usize,
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<Summary> {
    let mut previewer = Previewer::new();
    let mut summary = Summary::default();

    for (i, page) in cli.pages.iter().enumerate() {
        let key = page.to_string_lossy().into_owned();
        let ticket = previewer.show(&key);

        let outcome = match previewer.cached(&key).cloned() {
            Some(hit) => Ok(hit),
            None => load_page(&cli.html_dir, page).and_then(|html| {
                if let Some(dir) = &cli.fix_images {
                    write_fixed_page(dir, page, &html)?;
                }
                previewer
                    .complete(&ticket, &html)
                    .context("Preview request was superseded")
            }),
        };

        summary.pages += 1;

        match outcome {
            Ok(result) => {
                if PreviewState::of(&result) == PreviewState::Ready {
                    summary.with_content += 1;
                }
                write_result(cli, out, i, page, &key, &result)?;
            }
            Err(err) => {
                warn!(page = key.as_str(), "{:#}", err);
                if previewer.fail(&ticket).is_some() {
                    write_failure(cli, out, i, page, &key, &err)?;
                }
            }
        }
    }

    previewer.hide();
    out.flush()?;

    Ok(summary)
}

fn load_page(html_dir: &Path, page: &Path) -> Result<String> {
    let path = html_dir.join(page);
    fs::read_to_string(&path).with_context(|| format!("Failed to read page: {}", path.display()))
}

fn write_fixed_page(output_dir: &Path, page: &Path, html: &str) -> Result<()> {
    let path = output_dir.join(page);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&path, render::fix_image_paths(html))
        .with_context(|| format!("Failed to write fixed page: {}", path.display()))
}

fn page_title(page: &Path) -> String {
    page.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn write_separator(out: &mut impl Write, index: usize) -> Result<()> {
    if index > 0 {
        write!(out, "\n---\n\n")?;
    }
    Ok(())
}

fn write_result(
    cli: &Cli,
    out: &mut impl Write,
    index: usize,
    page: &Path,
    key: &str,
    result: &ExtractionResult,
) -> Result<()> {
    if cli.json {
        writeln!(out, "{}", json!({ "page": key, "result": result }))?;
    } else {
        write_separator(out, index)?;
        out.write_all(render::render_preview(&page_title(page), result).as_bytes())?;
    }
    Ok(())
}

fn write_failure(
    cli: &Cli,
    out: &mut impl Write,
    index: usize,
    page: &Path,
    key: &str,
    err: &anyhow::Error,
) -> Result<()> {
    if cli.json {
        writeln!(out, "{}", json!({ "page": key, "error": format!("{:#}", err) }))?;
    } else {
        write_separator(out, index)?;
        out.write_all(render::render_unavailable(&page_title(page)).as_bytes())?;
    }
    Ok(())
}
