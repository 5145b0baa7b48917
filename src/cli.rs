use clap::Parser;
use std::path::PathBuf;

/// Preview the quest and author sections of tutorial pages
#[derive(Parser, Debug)]
#[command(name = "quest-preview", version, about)]
pub struct Cli {
    /// Tutorial pages to preview, relative to --html-dir
    #[arg(required = true)]
    pub pages: Vec<PathBuf>,

    /// Directory the page names are resolved against
    #[arg(short = 'd', long, env = "QUEST_PREVIEW_HTML_DIR", default_value = ".")]
    pub html_dir: PathBuf,

    /// Print one JSON object per page instead of Markdown
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also write each page, with `../` image sources rewritten, into this directory
    #[arg(long)]
    pub fix_images: Option<PathBuf>,
}
