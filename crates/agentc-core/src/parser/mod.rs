//! Source parser: recovers an [`AgentSpec`] from artifact text.
//!
//! Parsing is best-effort and never fails. Each field is extracted
//! independently; a field that is missing or cannot be decoded falls back to
//! its empty value and is reported as a [`FieldIssue`], while the remaining
//! fields still parse. Schemas and tools are isolated with a balanced
//! delimiter scan ([`scan::balanced_span`]) because their literals nest.

pub mod scan;

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codegen::DIGEST_MARKER;
use crate::domain::{spec_digest, AgentSpec, Schema, ToolBinding};

use scan::balanced_span;

/// A field that could not be recovered cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

/// Whether the artifact still matches the digest it was generated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestStatus {
    /// Header digest equals the digest of the parsed spec.
    Matches,
    /// Header digest present but different: the literals were edited by hand.
    Edited,
    /// No digest header.
    Missing,
}

/// Result of parsing an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedArtifact {
    pub spec: AgentSpec,
    pub issues: Vec<FieldIssue>,
    pub digest: DigestStatus,
}

impl ParsedArtifact {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn label_regex(labels: &str, tail: &str) -> Regex {
    let pattern = format!(r"(?m)^[ \t]*(?:{labels})[ \t]*:[ \t]*{tail}");
    // Patterns are built from fixed labels and are always valid.
    Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid label pattern {pattern}: {e}"))
}

macro_rules! label {
    ($labels:literal, $tail:literal) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| label_regex($labels, $tail))
    }};
}

fn scalar_regex(field: &str) -> &'static Regex {
    match field {
        "name" => label!("name", r#"("(?:[^"\\\n]|\\.)*")"#),
        "description" => label!("description", r#"("(?:[^"\\\n]|\\.)*")"#),
        _ => label!("version", r#"("(?:[^"\\\n]|\\.)*")"#),
    }
}

/// Spans of `text` outside the system prompt literal, searched in order.
struct Regions {
    spans: Vec<Range<usize>>,
}

impl Regions {
    fn excluding(text: &str, prompt: Option<&Range<usize>>) -> Self {
        let spans = match prompt {
            Some(p) => vec![0..p.start, p.end..text.len()],
            None => vec![0..text.len()],
        };
        Self { spans }
    }

    /// First match of `re` in any region, as absolute offsets of the whole
    /// match and of capture group 1 when present.
    fn find(&self, text: &str, re: &Regex) -> Option<(Range<usize>, Option<Range<usize>>)> {
        self.spans.iter().find_map(|span| {
            let slice = &text[span.clone()];
            re.captures(slice).map(|caps| {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let shift = |r: Range<usize>| span.start + r.start..span.start + r.end;
                (shift(whole), caps.get(1).map(|m| shift(m.range())))
            })
        })
    }
}

struct Parser<'a> {
    text: &'a str,
    issues: Vec<FieldIssue>,
}

impl<'a> Parser<'a> {
    fn issue(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field,
            message: message.into(),
        });
    }

    /// Locate the raw prompt literal; returns its content and the span of
    /// the whole literal.
    fn system_prompt(&mut self) -> (String, Option<Range<usize>>) {
        let opener = label!("system_prompt|systemPrompt", r#"r(#*)""#);
        let Some(caps) = opener.captures(self.text) else {
            return self.quoted_prompt();
        };

        let (Some(whole), Some(hashes)) = (caps.get(0), caps.get(1)) else {
            return self.quoted_prompt();
        };
        let content_start = whole.end();
        let closing = format!("\"{}", hashes.as_str());

        match self.text[content_start..].find(&closing) {
            Some(len) => {
                let content = self.text[content_start..content_start + len].to_string();
                let literal_start = whole.end() - hashes.len() - 2;
                let literal_end = content_start + len + closing.len();
                (content, Some(literal_start..literal_end))
            }
            None => {
                self.issue("system_prompt", "raw literal is not terminated");
                (String::new(), None)
            }
        }
    }

    /// Fallback for hand edits that turned the prompt into a quoted literal.
    fn quoted_prompt(&mut self) -> (String, Option<Range<usize>>) {
        let re = label!("system_prompt|systemPrompt", r#"("(?:[^"\\]|\\.)*")"#);
        match re.captures(self.text).and_then(|c| c.get(1)) {
            Some(m) => match serde_json::from_str::<String>(m.as_str()) {
                Ok(value) => (value, Some(m.range())),
                Err(e) => {
                    self.issue("system_prompt", format!("undecodable literal: {e}"));
                    (String::new(), Some(m.range()))
                }
            },
            None => {
                self.issue("system_prompt", "label not found");
                (String::new(), None)
            }
        }
    }

    fn scalar(&mut self, field: &'static str, regions: &Regions) -> String {
        let Some((_, Some(lit))) = regions.find(self.text, scalar_regex(field)) else {
            self.issue(field, "label not found");
            return String::new();
        };

        match serde_json::from_str::<String>(&self.text[lit]) {
            Ok(value) => value,
            Err(e) => {
                self.issue(field, format!("undecodable literal: {e}"));
                String::new()
            }
        }
    }

    /// Isolate the balanced literal after a label and decode it.
    fn structured<T: DeserializeOwned + Default>(
        &mut self,
        field: &'static str,
        label: &Regex,
        (open, close): (u8, u8),
        regions: &Regions,
    ) -> T {
        let Some((whole, _)) = regions.find(self.text, label) else {
            self.issue(field, "label not found");
            return T::default();
        };

        let span = match balanced_span(self.text, whole.end, open, close) {
            Ok(span) => span,
            Err(e) => {
                self.issue(field, e.to_string());
                return T::default();
            }
        };

        match serde_json::from_str::<T>(&self.text[span]) {
            Ok(value) => value,
            Err(e) => {
                self.issue(field, format!("undecodable literal: {e}"));
                T::default()
            }
        }
    }

    fn digest_status(&self, spec: &AgentSpec) -> DigestStatus {
        let stamped = self
            .text
            .lines()
            .find_map(|line| line.trim_start().strip_prefix(DIGEST_MARKER))
            .map(str::trim);

        match (stamped, spec_digest(spec)) {
            (Some(stamped), Ok(actual)) if stamped == actual => DigestStatus::Matches,
            (Some(_), _) => DigestStatus::Edited,
            (None, _) => DigestStatus::Missing,
        }
    }
}

/// Parse artifact text into a spec plus per-field diagnostics.
pub fn parse_artifact(text: &str) -> ParsedArtifact {
    let mut parser = Parser {
        text,
        issues: Vec::new(),
    };

    let (system_prompt, prompt_span) = parser.system_prompt();
    let regions = Regions::excluding(text, prompt_span.as_ref());

    let name = parser.scalar("name", &regions);
    let description = parser.scalar("description", &regions);
    let version = parser.scalar("version", &regions);

    let tools: Vec<ToolBinding> =
        parser.structured("tools", label!("tools", ""), (b'[', b']'), &regions);
    let input_schema: Schema = parser.structured(
        "input_schema",
        label!("input_schema|inputSchema", ""),
        (b'{', b'}'),
        &regions,
    );
    let output_schema: Schema = parser.structured(
        "output_schema",
        label!("output_schema|outputSchema", ""),
        (b'{', b'}'),
        &regions,
    );

    let spec = AgentSpec {
        name,
        description,
        version,
        system_prompt,
        tools,
        input_schema,
        output_schema,
    };

    for issue in &parser.issues {
        crate::obs::emit_parse_issue(&spec.name, issue.field, &issue.message);
    }

    let digest = parser.digest_status(&spec);
    ParsedArtifact {
        spec,
        issues: parser.issues,
        digest,
    }
}

/// Parse artifact text, discarding diagnostics.
pub fn parse_spec(text: &str) -> AgentSpec {
    parse_artifact(text).spec
}
