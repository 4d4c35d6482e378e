//! Conventional commit parsing
//!
//! Turns raw commit blocks (message text followed by `-hash-` and the commit
//! id) into structured [`Commit`] values.

use crate::boundary::{Advisory, Warn};
use crate::domain::{Commit, Note, Revert};
use crate::error::{BumpError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

const DEFAULT_HEADER_PATTERN: &str = r"^(\w*)(?:\(([\w$.\-* ]*)\))?: (.*)$";
const DEFAULT_REVERT_PATTERN: &str = r#"^Revert\s"([\s\S]*)"\s*This reverts commit (\w*)\."#;
const DEFAULT_FIELD_PATTERN: &str = r"^-(.*?)-$";

fn default_header_correspondence() -> Vec<String> {
    vec!["type".into(), "scope".into(), "subject".into()]
}

fn default_revert_correspondence() -> Vec<String> {
    vec!["header".into(), "hash".into()]
}

fn default_note_keywords() -> Vec<String> {
    vec!["BREAKING CHANGE".into()]
}

fn default_issue_prefixes() -> Vec<String> {
    vec!["#".into()]
}

/// Options controlling how commit messages are parsed.
///
/// Every field is optional so option sets can be layered: when merging, a
/// field set on the overriding layer replaces the one below it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserOptions {
    pub header_pattern: Option<String>,
    pub header_correspondence: Option<Vec<String>>,
    /// Header pattern that marks a breaking change with `!`
    pub breaking_header_pattern: Option<String>,
    pub note_keywords: Option<Vec<String>>,
    pub revert_pattern: Option<String>,
    pub revert_correspondence: Option<Vec<String>>,
    pub merge_pattern: Option<String>,
    pub field_pattern: Option<String>,
    pub issue_prefixes: Option<Vec<String>>,

    #[serde(skip)]
    pub warn: Option<Warn>,
}

impl ParserOptions {
    /// Layer `overrides` on top of `self`; fields set in `overrides` win
    pub fn merge(self, overrides: ParserOptions) -> ParserOptions {
        ParserOptions {
            header_pattern: overrides.header_pattern.or(self.header_pattern),
            header_correspondence: overrides
                .header_correspondence
                .or(self.header_correspondence),
            breaking_header_pattern: overrides
                .breaking_header_pattern
                .or(self.breaking_header_pattern),
            note_keywords: overrides.note_keywords.or(self.note_keywords),
            revert_pattern: overrides.revert_pattern.or(self.revert_pattern),
            revert_correspondence: overrides
                .revert_correspondence
                .or(self.revert_correspondence),
            merge_pattern: overrides.merge_pattern.or(self.merge_pattern),
            field_pattern: overrides.field_pattern.or(self.field_pattern),
            issue_prefixes: overrides.issue_prefixes.or(self.issue_prefixes),
            warn: overrides.warn.or(self.warn),
        }
    }

    pub fn with_header_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.header_pattern = Some(pattern.into());
        self
    }

    pub fn with_header_correspondence<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_correspondence = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_note_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.note_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_warn(mut self, warn: Warn) -> Self {
        self.warn = Some(warn);
        self
    }
}

fn compile(pattern: &str, option: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| BumpError::parser(format!("invalid {} '{}': {}", option, pattern, e)))
}

/// Parser for conventional commit messages, built from [`ParserOptions`]
#[derive(Debug)]
pub struct CommitParser {
    header: Regex,
    header_correspondence: Vec<String>,
    breaking_header: Option<Regex>,
    note: Option<Regex>,
    revert: Regex,
    revert_correspondence: Vec<String>,
    merge: Option<Regex>,
    field: Regex,
    reference: Option<Regex>,
    warn: Option<Warn>,
}

impl CommitParser {
    /// Compile the patterns of `options`, falling back to conventional defaults
    pub fn new(options: &ParserOptions) -> Result<Self> {
        let header = compile(
            options
                .header_pattern
                .as_deref()
                .unwrap_or(DEFAULT_HEADER_PATTERN),
            "header pattern",
        )?;
        let breaking_header = options
            .breaking_header_pattern
            .as_deref()
            .map(|p| compile(p, "breaking header pattern"))
            .transpose()?;
        let revert = compile(
            options
                .revert_pattern
                .as_deref()
                .unwrap_or(DEFAULT_REVERT_PATTERN),
            "revert pattern",
        )?;
        let merge = options
            .merge_pattern
            .as_deref()
            .map(|p| compile(p, "merge pattern"))
            .transpose()?;
        let field = compile(
            options
                .field_pattern
                .as_deref()
                .unwrap_or(DEFAULT_FIELD_PATTERN),
            "field pattern",
        )?;

        let keywords = options
            .note_keywords
            .clone()
            .unwrap_or_else(default_note_keywords);
        let note = if keywords.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
            Some(compile(
                &format!(r"^[\s|*]*({})[:\s]+(.*)", alternatives.join("|")),
                "note keywords",
            )?)
        };

        let prefixes = options
            .issue_prefixes
            .clone()
            .unwrap_or_else(default_issue_prefixes);
        let reference = if prefixes.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
            Some(compile(
                &format!(r"(?:^|[\s(])(?:{})(\d+)", alternatives.join("|")),
                "issue prefixes",
            )?)
        };

        Ok(CommitParser {
            header,
            header_correspondence: options
                .header_correspondence
                .clone()
                .unwrap_or_else(default_header_correspondence),
            breaking_header,
            note,
            revert,
            revert_correspondence: options
                .revert_correspondence
                .clone()
                .unwrap_or_else(default_revert_correspondence),
            merge,
            field,
            reference,
            warn: options.warn.clone(),
        })
    }

    /// Parse one raw commit block.
    ///
    /// Returns `None` for blank blocks, which are dropped from the stream.
    pub fn parse(&self, raw: &str) -> Option<Commit> {
        let mut message_lines: Vec<&str> = Vec::new();
        let mut hash: Option<String> = None;
        let mut current_field: Option<String> = None;

        for line in raw.lines() {
            if let Some(captures) = self.field.captures(line.trim()) {
                current_field = captures.get(1).map(|m| m.as_str().to_string());
                continue;
            }
            match current_field.as_deref() {
                None => message_lines.push(line),
                Some("hash") => {
                    let value = line.trim();
                    if !value.is_empty() && hash.is_none() {
                        hash = Some(value.to_string());
                    }
                }
                Some(_) => {}
            }
        }

        let message = message_lines.join("\n");
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        let mut lines = message.lines();
        let mut header = lines.next().unwrap_or_default().trim().to_string();
        let mut merge = None;

        if let Some(merge_pattern) = &self.merge {
            if merge_pattern.is_match(&header) {
                merge = Some(header.clone());
                header = lines
                    .by_ref()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or_default()
                    .trim()
                    .to_string();
            }
        }

        let mut commit = Commit {
            header: Some(header.clone()),
            merge,
            hash,
            ..Default::default()
        };

        match self.header.captures(&header) {
            Some(captures) => {
                for (index, field) in self.header_correspondence.iter().enumerate() {
                    let value = captures
                        .get(index + 1)
                        .map(|m| m.as_str().to_string())
                        .filter(|v| !v.is_empty());
                    match field.as_str() {
                        "type" => commit.r#type = value,
                        "scope" => commit.scope = value,
                        "subject" => commit.subject = value,
                        _ => {}
                    }
                }
            }
            None => {
                if let Some(warn) = &self.warn {
                    warn.advise(&Advisory::UnparsableHeader {
                        header: header.clone(),
                    });
                }
            }
        }

        self.parse_body_and_notes(lines, &mut commit);

        if let Some(breaking) = &self.breaking_header {
            if breaking.is_match(&header) && !commit.is_breaking_change() {
                commit.notes.push(Note {
                    title: "BREAKING CHANGE".to_string(),
                    text: commit.subject.clone().unwrap_or_default(),
                });
            }
        }

        commit.revert = self.parse_revert(message);
        commit.references = self.parse_references(message);

        Some(commit)
    }

    fn parse_body_and_notes<'a>(&self, lines: impl Iterator<Item = &'a str>, commit: &mut Commit) {
        let mut body: Vec<&str> = Vec::new();
        let mut footer: Vec<&str> = Vec::new();
        let mut in_footer = false;

        for line in lines {
            if let Some(captures) = self.note.as_ref().and_then(|re| re.captures(line)) {
                in_footer = true;
                commit.notes.push(Note {
                    title: captures[1].to_string(),
                    text: captures[2].trim().to_string(),
                });
                footer.push(line);
                continue;
            }

            if in_footer {
                footer.push(line);
                if let Some(note) = commit.notes.last_mut() {
                    if !line.trim().is_empty() {
                        if !note.text.is_empty() {
                            note.text.push('\n');
                        }
                        note.text.push_str(line.trim());
                    }
                }
            } else {
                body.push(line);
            }
        }

        let body = body.join("\n");
        let body = body.trim();
        if !body.is_empty() {
            commit.body = Some(body.to_string());
        }
        let footer = footer.join("\n");
        let footer = footer.trim();
        if !footer.is_empty() {
            commit.footer = Some(footer.to_string());
        }
    }

    fn parse_revert(&self, message: &str) -> Option<Revert> {
        let captures = self.revert.captures(message)?;
        let mut revert = Revert::default();
        for (index, field) in self.revert_correspondence.iter().enumerate() {
            let value = captures
                .get(index + 1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|v| !v.is_empty());
            match field.as_str() {
                "header" => revert.header = value,
                "hash" => revert.hash = value,
                _ => {}
            }
        }
        Some(revert)
    }

    fn parse_references(&self, message: &str) -> Vec<String> {
        let Some(reference) = &self.reference else {
            return Vec::new();
        };
        let mut issues: Vec<String> = Vec::new();
        for captures in reference.captures_iter(message) {
            let issue = captures[1].to_string();
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn parser() -> CommitParser {
        CommitParser::new(&ParserOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_with_scope() {
        let commit = parser().parse("feat(auth): add login\n-hash-\nabc123").unwrap();
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.scope.as_deref(), Some("auth"));
        assert_eq!(commit.subject.as_deref(), Some("add login"));
        assert_eq!(commit.hash.as_deref(), Some("abc123"));
        assert!(!commit.is_breaking_change());
    }

    #[test]
    fn test_parse_without_scope() {
        let commit = parser().parse("fix: handle nulls").unwrap();
        assert_eq!(commit.r#type.as_deref(), Some("fix"));
        assert_eq!(commit.scope, None);
        assert_eq!(commit.hash, None);
    }

    #[test]
    fn test_parse_body_and_breaking_footer() {
        let raw = "fix: rename field\n\nLonger explanation.\n\nBREAKING CHANGE: field X is now Y\nmigrate callers\n-hash-\nfff000";
        let commit = parser().parse(raw).unwrap();
        assert_eq!(commit.body.as_deref(), Some("Longer explanation."));
        assert_eq!(commit.notes.len(), 1);
        assert_eq!(commit.notes[0].title, "BREAKING CHANGE");
        assert_eq!(commit.notes[0].text, "field X is now Y\nmigrate callers");
        assert!(commit.footer.as_deref().unwrap().starts_with("BREAKING CHANGE"));
        assert!(commit.is_breaking_change());
    }

    #[test]
    fn test_parse_breaking_header_pattern() {
        let options = ParserOptions {
            header_pattern: Some(r"^(\w*)(?:\((.*)\))?!?: (.*)$".to_string()),
            breaking_header_pattern: Some(r"^(\w*)(?:\((.*)\))?!: (.*)$".to_string()),
            ..Default::default()
        };
        let commit = CommitParser::new(&options)
            .unwrap()
            .parse("feat(api)!: drop v1 endpoints")
            .unwrap();
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.notes[0].text, "drop v1 endpoints");
    }

    #[test]
    fn test_parse_revert() {
        let raw = "Revert \"feat: add thing\"\n\nThis reverts commit 1234abcd.\n-hash-\n9999";
        let commit = parser().parse(raw).unwrap();
        let revert = commit.revert.unwrap();
        assert_eq!(revert.header.as_deref(), Some("feat: add thing"));
        assert_eq!(revert.hash.as_deref(), Some("1234abcd"));
    }

    #[test]
    fn test_parse_references() {
        let commit = parser().parse("fix: crash (#12)\n\nCloses #34, #12").unwrap();
        assert_eq!(commit.references, vec!["12".to_string(), "34".to_string()]);
    }

    #[test]
    fn test_parse_merge_header() {
        let options = ParserOptions {
            merge_pattern: Some(r"^Merge pull request #(\d+) from (.*)$".to_string()),
            ..Default::default()
        };
        let raw = "Merge pull request #7 from me/branch\n\nfeat: merged feature";
        let commit = CommitParser::new(&options).unwrap().parse(raw).unwrap();
        assert_eq!(
            commit.merge.as_deref(),
            Some("Merge pull request #7 from me/branch")
        );
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
    }

    #[test]
    fn test_parse_blank_block_is_dropped() {
        assert!(parser().parse("  \n\n-hash-\nabc").is_none());
        assert!(parser().parse("").is_none());
    }

    #[test]
    fn test_non_conventional_header_warns() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let options = ParserOptions::default()
            .with_warn(Warn::new(move |msg| sink.lock().unwrap().push(msg.to_string())));

        let commit = CommitParser::new(&options)
            .unwrap()
            .parse("my first commit")
            .unwrap();

        assert_eq!(commit.r#type, None);
        assert_eq!(commit.header.as_deref(), Some("my first commit"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Cannot parse commit header: \"my first commit\"".to_string()]
        );
    }

    #[test]
    fn test_custom_header_correspondence() {
        let options = ParserOptions::default()
            .with_header_pattern(r"^\[(\w+)\] (.*)$")
            .with_header_correspondence(["type", "subject"]);
        let commit = CommitParser::new(&options)
            .unwrap()
            .parse("[feat] custom format")
            .unwrap();
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.subject.as_deref(), Some("custom format"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let options = ParserOptions::default().with_header_pattern("(unclosed");
        let err = CommitParser::new(&options).unwrap_err();
        assert!(matches!(err, BumpError::Parser(_)));
    }

    #[test]
    fn test_merge_override_wins() {
        let preset = ParserOptions::default()
            .with_header_pattern("preset")
            .with_note_keywords(["BREAKING CHANGE"]);
        let caller = ParserOptions::default().with_header_pattern("caller");
        let merged = preset.merge(caller);
        assert_eq!(merged.header_pattern.as_deref(), Some("caller"));
        assert_eq!(
            merged.note_keywords,
            Some(vec!["BREAKING CHANGE".to_string()])
        );
    }
}
