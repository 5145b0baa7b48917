use crate::extractor::{ExtractionResult, QuestImage};
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.?\s*").expect("leading number pattern"));

/// Quoted attribute values are consumed whole so a `>` inside one does not end
/// the tag, and `src` must follow whitespace so `data-src` is left alone.
static RELATIVE_IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<img\b(?:"[^"]*"|'[^']*'|[^'">])*?\ssrc\s*=\s*["']?)\.\./"#)
        .expect("img src pattern")
});

/// What the preview should show for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    /// No quest heading anywhere on the page.
    SectionNotFound,
    /// A quest heading exists but nothing usable follows it.
    ContentNotFound,
    Ready,
    /// The page itself could not be loaded.
    Unavailable,
}

impl PreviewState {
    pub fn of(result: &ExtractionResult) -> Self {
        if !result.found {
            PreviewState::SectionNotFound
        } else if !result.has_content {
            PreviewState::ContentNotFound
        } else {
            PreviewState::Ready
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            PreviewState::SectionNotFound => Some("Quest section not found"),
            PreviewState::ContentNotFound => Some("Quest content not found"),
            PreviewState::Ready => None,
            PreviewState::Unavailable => Some("Quest preview not available"),
        }
    }
}

/// Render a result as the Markdown shown in a preview.
pub fn render_preview(title: &str, result: &ExtractionResult) -> String {
    let mut blocks = Vec::new();
    push_title(&mut blocks, title);

    match PreviewState::of(result).message() {
        Some(message) => blocks.push(message.to_string()),
        None => {
            if !result.items.is_empty() {
                blocks.push(numbered_list(&result.items));
            }
            if !result.images.is_empty() {
                blocks.push(
                    result
                        .images
                        .iter()
                        .map(image_markdown)
                        .collect::<Vec<_>>()
                        .join("\n"),
                );
            }
        }
    }

    if !result.authors.is_empty() {
        blocks.push(format!("*Author(s): {}*", result.authors.join(", ")));
    }

    finish(blocks)
}

/// Render the state shown when the page could not be loaded at all.
pub fn render_unavailable(title: &str) -> String {
    let mut blocks = Vec::new();
    push_title(&mut blocks, title);
    if let Some(message) = PreviewState::Unavailable.message() {
        blocks.push(message.to_string());
    }
    finish(blocks)
}

fn push_title(blocks: &mut Vec<String>, title: &str) {
    let title = title.trim();
    if !title.is_empty() {
        blocks.push(format!("## {}", title));
    }
}

fn finish(blocks: Vec<String>) -> String {
    let result = blocks.join("\n\n");
    if result.is_empty() {
        result
    } else {
        result + "\n"
    }
}

fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item = LEADING_NUMBER.replace(item, "");
            let item = item.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{}. {}", i + 1, item)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn image_markdown(image: &QuestImage) -> String {
    if image.title.is_empty() {
        format!("![{}]({})", image.alt, image.src)
    } else {
        format!("![{}]({} \"{}\")", image.alt, image.src, image.title)
    }
}

/// Strip a leading `../` from every `img` source in a page. The preview is
/// served from one directory above the tutorial pages.
pub fn fix_image_paths(html: &str) -> String {
    RELATIVE_IMG_SRC.replace_all(html, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(items: &[&str], authors: &[&str]) -> ExtractionResult {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        ExtractionResult {
            has_content: !items.is_empty(),
            items,
            authors: authors.iter().map(|s| s.to_string()).collect(),
            found: true,
            ..ExtractionResult::default()
        }
    }

    #[test]
    fn classifies_states() {
        assert_eq!(
            PreviewState::of(&ExtractionResult::default()),
            PreviewState::SectionNotFound
        );
        assert_eq!(PreviewState::of(&result(&[], &[])), PreviewState::ContentNotFound);
        assert_eq!(
            PreviewState::of(&result(&["Do the thing"], &[])),
            PreviewState::Ready
        );
    }

    #[test]
    fn renders_missing_section() {
        let md = render_preview("Loops", &ExtractionResult::default());
        assert_eq!(md, "## Loops\n\nQuest section not found\n");
    }

    #[test]
    fn renders_items_renumbered_with_authors() {
        let md = render_preview(
            "Loops",
            &result(&["1. Write the loop", "Print\n   the   total"], &["Ada", "Grace"]),
        );
        assert_eq!(
            md,
            "## Loops\n\n1. Write the loop\n2. Print the total\n\n*Author(s): Ada, Grace*\n"
        );
    }

    #[test]
    fn authors_follow_error_states_too() {
        let md = render_preview("", &result(&[], &["Ada"]));
        assert_eq!(md, "Quest content not found\n\n*Author(s): Ada*\n");
    }

    #[test]
    fn renders_images_after_items() {
        let mut r = result(&["Draw the diagram"], &[]);
        r.images = vec![
            QuestImage {
                src: "img/a.png".into(),
                alt: "diagram".into(),
                title: String::new(),
            },
            QuestImage {
                src: "img/b.png".into(),
                alt: "Quest image".into(),
                title: "Step two".into(),
            },
        ];
        let md = render_preview("", &r);
        assert_eq!(
            md,
            "1. Draw the diagram\n\n![diagram](img/a.png)\n![Quest image](img/b.png \"Step two\")\n"
        );
    }

    #[test]
    fn renders_images_without_items() {
        let mut r = result(&[], &["Ada"]);
        r.has_content = true;
        r.images = vec![QuestImage {
            src: "img/a.png".into(),
            alt: "diagram".into(),
            title: String::new(),
        }];

        assert_eq!(PreviewState::of(&r), PreviewState::Ready);
        assert_eq!(
            render_preview("Loops", &r),
            "## Loops\n\n![diagram](img/a.png)\n\n*Author(s): Ada*\n"
        );
    }

    #[test]
    fn renders_unavailable() {
        assert_eq!(
            render_unavailable("Loops"),
            "## Loops\n\nQuest preview not available\n"
        );
    }

    #[test]
    fn fixes_only_image_sources() {
        let html = r#"<a href="../index.html">Back</a><IMG alt="x" SRC="../img/a.png"><img src='../b.png'><img src="c/../d.png">"#;
        assert_eq!(
            fix_image_paths(html),
            r#"<a href="../index.html">Back</a><IMG alt="x" SRC="img/a.png"><img src='b.png'><img src="c/../d.png">"#
        );

        assert_eq!(
            fix_image_paths(r#"<img data-src="../lazy.png" src="../real.png">"#),
            r#"<img data-src="../lazy.png" src="real.png">"#
        );
        assert_eq!(
            fix_image_paths(r#"<img alt="a > b" src="../real.png">"#),
            r#"<img alt="a > b" src="real.png">"#
        );
        assert_eq!(
            fix_image_paths("<img title='it\"s > here' src=../bare.png>"),
            "<img title='it\"s > here' src=bare.png>"
        );
    }
}
