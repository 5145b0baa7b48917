/// Canonical form of a heading's text: trimmed, upper-cased, pilcrows and
/// colons removed, whitespace runs collapsed to a single space.
pub fn normalize(text: &str) -> String {
    let upper = text.trim().to_uppercase();
    let mut out = String::with_capacity(upper.len());
    let mut in_space = false;

    for ch in upper.chars().filter(|c| !matches!(c, '¶' | ':')) {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }

    out
}

pub fn is_quest_heading(text: &str) -> bool {
    let clean = normalize(text);

    clean == "QUEST"
        || clean == "QUESTS"
        || clean.starts_with("QUEST ")
        || clean.ends_with(" QUEST")
        || text.trim().to_uppercase().contains("QUEST:")
}

pub fn is_author_heading(text: &str) -> bool {
    let clean = normalize(text);
    let raw = text.trim().to_uppercase();

    matches!(
        clean.as_str(),
        "AUTHOR" | "AUTHORS" | "AUTHOR(S)" | "AUTHORS(S)"
    ) || clean.starts_with("AUTHOR ")
        || clean.starts_with("AUTHORS ")
        || raw.contains("AUTHOR:")
        || raw.contains("AUTHORS:")
}

/// `h1` through `h6`.
pub fn is_heading_tag(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_notebook_anchor_text() {
        assert_eq!(normalize("  Quest¶ "), "QUEST");
        assert_eq!(normalize("Daily\n\t quest:"), "DAILY QUEST");
        // Removing the pilcrow can leave a trailing space behind.
        assert_eq!(normalize("Quest ¶"), "QUEST ");
    }

    #[test]
    fn classifies_quest_headings() {
        for text in [
            "Quest",
            "quests",
            "Quest¶",
            "Quest 1: loops",
            "Your Quest",
            "Side quest:",
            "Bonus QUEST: extra credit",
        ] {
            assert!(is_quest_heading(text), "{text:?} should be a quest heading");
        }

        for text in ["Questions", "Request a topic", "Conquest", "Introduction"] {
            assert!(!is_quest_heading(text), "{text:?} should not match");
        }
    }

    #[test]
    fn colon_check_uses_text_before_stripping() {
        assert!(is_quest_heading("Main quest:details"));
        assert!(!is_quest_heading("Main questdetails"));
    }

    #[test]
    fn classifies_author_headings() {
        for text in [
            "Author",
            "Authors¶",
            "Author(s)",
            "AUTHORS(S)",
            "Author notes",
            "Authors of this page",
            "Written by author: Jane",
        ] {
            assert!(is_author_heading(text), "{text:?} should be an author heading");
        }

        for text in ["Authority", "Co-authors", "Quest"] {
            assert!(!is_author_heading(text), "{text:?} should not match");
        }
    }

    #[test]
    fn heading_tags() {
        assert!(is_heading_tag("h1"));
        assert!(is_heading_tag("h6"));
        assert!(!is_heading_tag("h7"));
        assert!(!is_heading_tag("header"));
    }
}
