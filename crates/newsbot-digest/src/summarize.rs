//! Renders a cycle's fetch outcomes into the bilingual digest text.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use newsbot_core::{truncate_chars, FetchOutcome, Language, SourceKind, SourceRecord};

/// Records rendered per section; the rest are dropped from the digest.
pub const MAX_RECORDS_PER_SECTION: usize = 5;

/// Posts are cut to this many characters before `...` is appended.
pub const POST_MAX_CHARS: usize = 80;

pub const SECTION_SEPARATOR: &str = "\n\n";

/// The text delivered once per cycle. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    text: String,
}

impl Digest {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Length in characters, which is what the webhook limit counts.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds the digest for one cycle.
///
/// Sections follow [`SourceKind`] order. A failed source gets a single
/// `unavailable: <reason>` line instead of being omitted. The function is
/// pure: the same outcomes and timestamp always give the same text.
#[must_use]
pub fn summarize(
    outcomes: &BTreeMap<SourceKind, FetchOutcome>,
    generated_at: DateTime<Utc>,
) -> Digest {
    let mut sections = Vec::with_capacity(outcomes.len() + 1);
    sections.push(format!(
        "**News Summary - {} UTC**\n**ملخص الأخبار**",
        generated_at.format("%Y-%m-%d %H:%M")
    ));

    for (kind, outcome) in outcomes {
        sections.push(render_section(*kind, outcome));
    }

    Digest {
        text: sections.join(SECTION_SEPARATOR),
    }
}

fn render_section(kind: SourceKind, outcome: &FetchOutcome) -> String {
    let label = kind.label();
    match outcome {
        FetchOutcome::Failure(failure) => {
            format!("**{label}:** unavailable: {}", failure.reason)
        }
        FetchOutcome::Success(records) if records.is_empty() => {
            format!("**{label}:** no new items")
        }
        FetchOutcome::Success(records) => {
            let body = if kind == SourceKind::Posts {
                render_posts_by_language(records)
            } else {
                records
                    .iter()
                    .take(MAX_RECORDS_PER_SECTION)
                    .map(render_record)
                    .collect::<Vec<_>>()
            };
            format!("**{label}:**\n{}", body.join("\n"))
        }
    }
}

/// Post groups in display order; the last one holds any non-post records.
const POST_GROUPS: [&str; 4] = ["*English:*", "*العربية (Arabic):*", "*Other:*", ""];

fn post_group(record: &SourceRecord) -> usize {
    match record {
        SourceRecord::Post {
            language: Language::English,
            ..
        } => 0,
        SourceRecord::Post {
            language: Language::Arabic,
            ..
        } => 1,
        SourceRecord::Post { .. } => 2,
        _ => 3,
    }
}

/// English first, then Arabic, then anything else, each under its own heading.
///
/// The section cap is shared round-robin between groups, so a flood of
/// English posts cannot push every Arabic one out of the digest.
fn render_posts_by_language(records: &[SourceRecord]) -> Vec<String> {
    let mut groups: [Vec<&SourceRecord>; 4] = Default::default();
    for record in records {
        groups[post_group(record)].push(record);
    }

    let mut quota = [0usize; 4];
    let mut taken = 0;
    while taken < MAX_RECORDS_PER_SECTION {
        let before = taken;
        for (members, n) in groups.iter().zip(quota.iter_mut()) {
            if taken < MAX_RECORDS_PER_SECTION && *n < members.len() {
                *n += 1;
                taken += 1;
            }
        }
        if taken == before {
            break;
        }
    }

    let mut lines = Vec::new();
    for ((heading, members), n) in POST_GROUPS.iter().zip(&groups).zip(quota) {
        if n == 0 {
            continue;
        }
        if !heading.is_empty() {
            lines.push((*heading).to_owned());
        }
        lines.extend(members[..n].iter().map(|r| render_record(r)));
    }
    lines
}

fn render_record(record: &SourceRecord) -> String {
    match record {
        SourceRecord::News { headline, url, .. } => match url {
            // Angle brackets stop the webhook target from unfurling every link.
            Some(url) => format!("- {headline} (<{url}>)"),
            None => format!("- {headline}"),
        },
        SourceRecord::Indicator { name, value, date } => {
            format!("- {name}: {value} (as of {})", date.format("%Y-%m-%d"))
        }
        SourceRecord::Sentiment { asset, score } => {
            format!("- {asset}: {score:.0}% positive")
        }
        SourceRecord::Post { text, author, .. } => {
            let text = truncate_chars(text, POST_MAX_CHARS);
            match author {
                Some(author) => format!("- {text} (@{author})"),
                None => format!("- {text}"),
            }
        }
        SourceRecord::FeedItem {
            headline, summary, ..
        } => {
            if summary.is_empty() {
                format!("- **{headline}**")
            } else {
                format!("- **{headline}**\n  {summary}")
            }
        }
    }
}
