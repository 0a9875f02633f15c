//! Leading YAML front matter.

use yaml_rust2::{Yaml, YamlLoader};

use crate::{MindmapError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
}

/// Splits a leading `---` delimited block from the document body.
pub fn split_front_matter(markdown: &str) -> (Option<&str>, &str) {
    let Some(rest) = markdown.strip_prefix("---") else {
        return (None, markdown);
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, markdown);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = rest[..offset].trim_end_matches(['\r', '\n']);
            return (Some(yaml), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, markdown)
}

pub fn parse_front_matter(yaml: &str) -> Result<FrontMatter> {
    let docs = YamlLoader::load_from_str(yaml).map_err(|err| MindmapError::Yaml(err.to_string()))?;
    let Some(doc) = docs.first() else {
        return Ok(FrontMatter::default());
    };
    let title = match &doc["title"] {
        Yaml::String(title) if !title.trim().is_empty() => Some(title.trim().to_string()),
        _ => None,
    };
    Ok(FrontMatter { title })
}

/// Front matter of `markdown`, if it has any that parses.
pub fn read_front_matter(markdown: &str) -> Option<FrontMatter> {
    let (yaml, _) = split_front_matter(markdown);
    match parse_front_matter(yaml?) {
        Ok(front_matter) => Some(front_matter),
        Err(err) => {
            tracing::warn!(%err, "ignoring unreadable front matter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_leading_block() {
        let (yaml, body) = split_front_matter("---\ntitle: Notes\n---\n# h1\n");
        assert_eq!(yaml, Some("title: Notes"));
        assert_eq!(body, "# h1\n");
    }

    #[test]
    fn leaves_documents_without_block_alone() {
        let markdown = "# h1\n---\n";
        assert_eq!(split_front_matter(markdown), (None, markdown));
        let unterminated = "---\ntitle: x\n# h1";
        assert_eq!(split_front_matter(unterminated), (None, unterminated));
        let rule = "--- not yaml";
        assert_eq!(split_front_matter(rule), (None, rule));
    }

    #[test]
    fn closing_line_must_be_exactly_three_dashes() {
        let (yaml, body) = split_front_matter("---\nnote: a\n---- x\n--- \r\n# h1\n");
        assert_eq!(yaml, Some("note: a\n---- x"));
        assert_eq!(body, "# h1\n");
    }

    #[test]
    fn empty_block_is_still_front_matter() {
        assert_eq!(split_front_matter("---\n---\nbody"), (Some(""), "body"));
    }

    #[test]
    fn reads_title() {
        let front_matter = parse_front_matter("title: Weekly plan\ntags: [a]").expect("parse");
        assert_eq!(front_matter.title.as_deref(), Some("Weekly plan"));
    }

    #[test]
    fn non_string_title_is_ignored() {
        let front_matter = parse_front_matter("title: 5").expect("parse");
        assert_eq!(front_matter.title, None);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = parse_front_matter("title: [unclosed").expect_err("expected error");
        assert!(matches!(err, MindmapError::Yaml(_)));
    }

    #[test]
    fn read_front_matter_skips_bad_yaml() {
        assert_eq!(read_front_matter("---\ntitle: [x\n---\nbody"), None);
    }
}
