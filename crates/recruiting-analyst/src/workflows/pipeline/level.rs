use super::domain::{Level, RoleFunction};
use super::normalizer::tokens;
use super::rules::LevelKeywords;

/// Keyword heuristic over a title or custom field value. Not a guarantee:
/// anything it cannot place is `Level::Unknown`.
pub(crate) fn infer_level(text: &str, keywords: &LevelKeywords) -> Level {
    let title_tokens = tokens(text);
    let joined = format!(" {} ", title_tokens.join(" "));

    for (keyword, level) in &keywords.keywords {
        let phrase = tokens(keyword).join(" ");
        if !phrase.is_empty() && joined.contains(&format!(" {phrase} ")) {
            return *level;
        }
    }

    numbered_level(&title_tokens, &keywords.numbered_roots).unwrap_or(Level::Unknown)
}

pub(crate) fn infer_role_function(title: &str, keywords: &LevelKeywords) -> RoleFunction {
    let title_tokens = tokens(title);
    let is_engineering = keywords.engineering_keywords.iter().any(|keyword| {
        let keyword = keyword.to_ascii_lowercase();
        title_tokens.iter().any(|token| {
            token
                .strip_prefix(keyword.as_str())
                .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
        })
    });

    if is_engineering {
        RoleFunction::Engineer
    } else {
        RoleFunction::Other
    }
}

fn numbered_level(title_tokens: &[String], roots: &[String]) -> Option<Level> {
    for (index, token) in title_tokens.iter().enumerate() {
        for root in roots {
            let root = root.to_ascii_lowercase();
            let Some(attached) = token.strip_prefix(root.as_str()) else {
                continue;
            };
            let suffix = if attached.is_empty() {
                title_tokens.get(index + 1).map(String::as_str).unwrap_or("")
            } else {
                attached
            };
            match suffix {
                "1" | "i" => return Some(Level::Swe1),
                "2" | "ii" => return Some(Level::Swe2),
                _ => {}
            }
        }
    }
    None
}
