//! RSS feed collector (Al Jazeera Arabic by default). Requires no credential.

use async_trait::async_trait;
use newsbot_core::{truncate_chars, FetchOutcome, Language, SourceKind, SourceRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{Client, Url};

use super::{into_outcome, SourceClient};
use crate::error::SourceError;
use crate::http::get_text;

const MAX_ITEMS: usize = 5;
const SUMMARY_MAX_CHARS: usize = 100;

/// Client for a single RSS 2.0 feed.
pub struct RssFeedClient {
    client: Client,
    feed_url: Url,
    /// Used when the channel does not declare `<language>`.
    default_language: Language,
}

impl RssFeedClient {
    /// Creates a client for `feed_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] if `feed_url` does not parse.
    pub fn new(
        client: Client,
        feed_url: &str,
        default_language: Language,
    ) -> Result<Self, SourceError> {
        let feed_url = Url::parse(feed_url).map_err(|e| SourceError::InvalidBaseUrl {
            url: feed_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            feed_url,
            default_language,
        })
    }

    async fn fetch_records(&self) -> Result<Vec<SourceRecord>, SourceError> {
        let body = get_text(self.client.get(self.feed_url.clone())).await?;
        let records = parse_feed(&body, &self.default_language, MAX_ITEMS)?;
        if records.is_empty() {
            return Err(SourceError::EmptyResponse {
                context: format!("rss feed {}", self.feed_url.path()),
            });
        }
        Ok(records)
    }
}

#[async_trait]
impl SourceClient for RssFeedClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }

    async fn fetch(&self) -> FetchOutcome {
        into_outcome(self.fetch_records().await)
    }
}

/// Parse an RSS XML feed into [`SourceRecord::FeedItem`]s.
///
/// Extracts `<title>` and `<description>` from each `<item>`, stripping HTML
/// from descriptions and cutting them to 100 characters. A channel-level
/// `<language>` overrides `default_language`. Stops after `max_items`.
pub(crate) fn parse_feed(
    xml: &str,
    default_language: &Language,
    max_items: usize,
) -> Result<Vec<SourceRecord>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut language = default_language.clone();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut description = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    title.clear();
                    description.clear();
                }
                current_tag = name;
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    let headline = title.trim();
                    if !headline.is_empty() {
                        records.push(SourceRecord::FeedItem {
                            headline: headline.to_owned(),
                            summary: truncate_chars(&strip_html(&description), SUMMARY_MAX_CHARS),
                            language: language.clone(),
                        });
                        if records.len() >= max_items {
                            break;
                        }
                    }
                }
                current_tag.clear();
            }
            Ok(Event::Text(e)) => {
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(err) => {
                        // Feeds use HTML entities like `&nbsp;` that XML does not define.
                        tracing::debug!(error = %err, "rss text kept unescaped");
                        String::from_utf8_lossy(&e).into_owned()
                    }
                };
                assign_text(
                    in_item,
                    &current_tag,
                    text,
                    &mut title,
                    &mut description,
                    &mut language,
                );
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                assign_text(
                    in_item,
                    &current_tag,
                    text,
                    &mut title,
                    &mut description,
                    &mut language,
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(records)
}

fn assign_text(
    in_item: bool,
    tag: &str,
    text: String,
    title: &mut String,
    description: &mut String,
    language: &mut Language,
) {
    match (in_item, tag) {
        (true, "title") => title.push_str(&text),
        (true, "description") => {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&text);
        }
        (false, "language") => {
            // Codes like "ar-SA" carry a region suffix.
            let primary = text.split(['-', '_']).next().unwrap_or_default();
            if !primary.trim().is_empty() {
                *language = Language::from_code(primary);
            }
        }
        _ => {}
    }
}

/// Strip HTML tags from a string and normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>الجزيرة نت</title>
    <language>ar-QA</language>
    <item>
      <title>ارتفاع أسعار النفط</title>
      <link>https://www.aljazeera.net/ebusiness/1</link>
      <description><![CDATA[<p>ارتفعت أسعار النفط <b>اليوم</b> بعد قرار أوبك.</p>]]></description>
    </item>
    <item>
      <title><![CDATA[البنك المركزي يثبت الفائدة]]></title>
      <description>قرار متوقع</description>
    </item>
    <item>
      <title></title>
      <description>no headline, skipped</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_with_cdata_and_channel_language() {
        let records = parse_feed(SAMPLE_RSS, &Language::English, 5).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            SourceRecord::FeedItem {
                headline: "ارتفاع أسعار النفط".to_owned(),
                summary: "ارتفعت أسعار النفط اليوم بعد قرار أوبك.".to_owned(),
                language: Language::Arabic,
            }
        );
        match &records[1] {
            SourceRecord::FeedItem { headline, .. } => {
                assert_eq!(headline, "البنك المركزي يثبت الفائدة");
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn stops_after_max_items() {
        let records = parse_feed(SAMPLE_RSS, &Language::Arabic, 1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn long_summaries_are_truncated() {
        let long = "كلمة ".repeat(60);
        let xml = format!(
            "<rss><channel><item><title>t</title><description>{long}</description></item></channel></rss>"
        );
        let records = parse_feed(&xml, &Language::Arabic, 5).unwrap();
        match &records[0] {
            SourceRecord::FeedItem { summary, .. } => {
                assert!(summary.ends_with("..."));
                assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn empty_channel_yields_no_records() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let records = parse_feed(xml, &Language::Arabic, 5).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let xml = "<rss><channel><item><title>x</channel></rss>";
        assert!(matches!(
            parse_feed(xml, &Language::Arabic, 5),
            Err(SourceError::Xml(_))
        ));
    }

    #[test]
    fn undefined_entity_keeps_the_item() {
        let xml = "<rss><channel><item><title>Oil&nbsp;prices rise</title>\
            <description>up &amp; away</description></item></channel></rss>";
        let records = parse_feed(xml, &Language::English, 5).unwrap();
        assert_eq!(
            records,
            vec![SourceRecord::FeedItem {
                headline: "Oil&nbsp;prices rise".to_owned(),
                summary: "up & away".to_owned(),
                language: Language::English,
            }]
        );
    }

    #[test]
    fn strip_html_separates_adjacent_blocks() {
        assert_eq!(strip_html("<p>one</p><p>two</p>"), "one two");
    }
}
