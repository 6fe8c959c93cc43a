/// A label in two byte-aligned forms: `display` keeps the source casing, `folded`
/// is its ASCII-lowercased twin used for keyword matching. Offsets found in one
/// are valid in the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedText {
    pub(crate) display: String,
    pub(crate) folded: String,
}

impl NormalizedText {
    pub(crate) fn new(value: &str) -> Self {
        let cleaned = value
            .replace(['\u{feff}', '\u{200b}'], "")
            .replace(['-', '_', '\u{2013}', '\u{2014}'], " ");
        let display = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let folded = display.to_ascii_lowercase();
        Self { display, folded }
    }
}

pub(crate) fn normalize_name(value: &str) -> String {
    NormalizedText::new(value).folded
}

/// Splits on anything that is not an ASCII letter or digit.
pub(crate) fn tokens(value: &str) -> Vec<String> {
    normalize_name(value)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_removes_whitespace_case_and_dashes() {
        let source = "\u{feff}Take-Home   Test \u{2013} Backend";
        assert_eq!(normalize_name(source), "take home test backend");
    }

    #[test]
    fn display_and_folded_stay_byte_aligned() {
        let text = NormalizedText::new("Jane  moved into  Onsite_Loop for SWE");
        assert_eq!(text.display, "Jane moved into Onsite Loop for SWE");
        assert_eq!(text.display.len(), text.folded.len());
        let at = text.folded.find("onsite").expect("marker present");
        assert_eq!(&text.display[at..at + 6], "Onsite");
    }

    #[test]
    fn tokens_split_on_punctuation() {
        assert_eq!(tokens("SWE2 - Infra/Platform"), vec!["swe2", "infra", "platform"]);
        assert!(tokens("  ").is_empty());
    }
}
