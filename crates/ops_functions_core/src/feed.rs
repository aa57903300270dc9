//! Syndication feed parsing and digest prompt composition.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POST_LIMIT: usize = 5;
pub const UNTITLED_POST: &str = "Untitled";

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("script/style pattern should compile")
});
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern should compile"));

const DIGEST_INTRODUCTION: &str =
    "I will provide you below the encoded text content for the Substack posts i have released this week.\n\n";

const DIGEST_INSTRUCTIONS: &str = r#"
# Instructions
Your goal is to generate 1 new essay that pulls together the ideas of those 5 posts to create a meta essay that ties those posts together.

The opening section must be at max 2 paragraphs and use a short story to a) hook the reader and b) naturally present and illustrate the theme of this essay and c) the story must be a relatable day to day example. This opening section must be formatted so it captures the user's attention to read the rest of the essay. Please bear in mind the opening section must be illustrative of that meta-idea in discussion for this new post, not the other original 5 posts.

The writing should be clear (the 5th grade level benchmark through use of simpler words and day to day examples) but retain its complex subjects. Titles must be written in sentence case.

Critical style requirements:

Do not include the typical sentence construction by LLMs like ChatGPT where it makes forced contrasting affirmations, such as "This isn't just X... - it's Y". Also minimize the usage of em dashes.

Do not use the constructs you always default to, such as "here's what most people get wrong" and "but a lot of people miss this". I do not want the text to include excessively hyperbolized statements nor obviously contrasting sentence construction.

Minimize references back to the opening story throughout the essay. Use the opening story to establish context, then shift to direct principles and insights. The story is a launching point, not a recurring anchor.

Be concise and direct. Each section should make its point efficiently without repetitive examples or over-explanation. If an idea can be conveyed in two sentences instead of five, use two.

Avoid redundancy. Don't restate the same concept multiple times with different examples unless each example adds genuinely new insight.

Target a 4-5 minute read (approximately 1,000-1,200 words). This is shorter than typical because it prioritizes clarity and impact over comprehensiveness.

Format the resulting text in regular markdown syntax, ready to send as an email body.
"#;

/// Raw `<item>` fields as they appear in the feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub content_html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedPost {
    pub title: String,
    pub link: String,
    pub published: String,
    pub content: String,
}

impl From<FeedItem> for FeedPost {
    fn from(item: FeedItem) -> Self {
        Self {
            title: item.title.unwrap_or_else(|| UNTITLED_POST.to_string()),
            link: item.link.unwrap_or_default(),
            published: item.published.unwrap_or_default(),
            content: item
                .content_html
                .as_deref()
                .map(html_to_text)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("malformed feed document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("No entries found in RSS feed")]
    NoEntries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemField {
    Title,
    Link,
    Published,
    Content,
}

impl ItemField {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"pubDate" => Some(Self::Published),
            b"content:encoded" => Some(Self::Content),
            _ => None,
        }
    }

    fn assign(self, item: &mut FeedItem, value: String) {
        let slot = match self {
            Self::Title => &mut item.title,
            Self::Link => &mut item.link,
            Self::Published => &mut item.published,
            Self::Content => &mut item.content_html,
        };
        *slot = Some(value);
    }
}

/// Collect every `<item>` in document order.
pub fn parse_feed_items(document: &str) -> Result<Vec<FeedItem>, FeedParseError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<ItemField> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                let name = tag.name();
                if name.as_ref() == b"item" {
                    current = Some(FeedItem::default());
                    field = None;
                } else if current.is_some() {
                    field = ItemField::from_tag(name.as_ref());
                    text.clear();
                }
            }
            Event::Text(value) if field.is_some() => {
                let decoded = value
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&value).into_owned());
                text.push_str(&decoded);
            }
            Event::CData(value) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&value));
            }
            Event::End(tag) => {
                let name = tag.name();
                if name.as_ref() == b"item" {
                    items.extend(current.take());
                    field = None;
                } else if let (Some(item), Some(active)) = (current.as_mut(), field) {
                    if ItemField::from_tag(name.as_ref()) == Some(active) {
                        active.assign(item, std::mem::take(&mut text));
                        field = None;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Parse the feed and keep the first `limit` entries as posts.
pub fn latest_posts(document: &str, limit: usize) -> Result<Vec<FeedPost>, FeedParseError> {
    let items = parse_feed_items(document)?;
    if items.is_empty() {
        return Err(FeedParseError::NoEntries);
    }

    Ok(items.into_iter().take(limit).map(FeedPost::from).collect())
}

/// Reduce an HTML fragment to its text nodes, one per line.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_OR_STYLE.replace_all(html, "");
    MARKUP_TAG
        .split(&without_scripts)
        .map(decode_html_entities)
        .map(|fragment| fragment.trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decodes every HTML5 named and numeric reference; stray `&` and unknown
/// names are kept as written.
fn decode_html_entities(fragment: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(fragment)
}

pub fn compose_digest_prompt(posts: &[FeedPost]) -> String {
    let mut prompt = String::from(DIGEST_INTRODUCTION);

    for (index, post) in posts.iter().enumerate() {
        prompt.push_str(&format!(
            "\nPOST {}: {}\n\nContent:\n{}\n\n---\n\n",
            index + 1,
            post.title,
            post.content
        ));
    }

    prompt.push_str(DIGEST_INSTRUCTIONS);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:content="http://purl.org/rss/1.0/modules/content/" version="2.0">
  <channel>
    <title>Channel title</title>
    <link>https://example.substack.com</link>
    <item>
      <title><![CDATA[First &amp; best]]></title>
      <link>https://example.substack.com/p/first</link>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
      <content:encoded><![CDATA[<p>Hello&nbsp;world</p><style>p{}</style><p>It&#8217;s <b>bold</b></p>]]></content:encoded>
    </item>
    <item>
      <title>Tom &amp; Jerry</title>
      <content:encoded><![CDATA[<div>Second</div>]]></content:encoded>
    </item>
    <item>
      <link>https://example.substack.com/p/third</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_ignores_channel_fields() {
        let items = parse_feed_items(SAMPLE_FEED).expect("feed should parse");

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title.as_deref(), Some("First &amp; best"));
        assert_eq!(items[0].link.as_deref(), Some("https://example.substack.com/p/first"));
        assert_eq!(
            items[0].published.as_deref(),
            Some("Mon, 06 Jan 2025 10:00:00 GMT")
        );
        assert_eq!(items[1].title.as_deref(), Some("Tom & Jerry"));
        assert_eq!(items[2].title, None);
    }

    #[test]
    fn posts_fill_defaults_and_strip_markup() {
        let posts = latest_posts(SAMPLE_FEED, DEFAULT_POST_LIMIT).expect("posts should parse");

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].content, "Hello\u{a0}world\nIt\u{2019}s\nbold");
        assert_eq!(posts[2].title, UNTITLED_POST);
        assert_eq!(posts[2].content, "");
        assert_eq!(posts[1].link, "");
    }

    #[test]
    fn limit_caps_number_of_posts() {
        let posts = latest_posts(SAMPLE_FEED, 2).expect("posts should parse");
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn feed_without_items_is_an_error() {
        let error = latest_posts("<rss><channel><title>x</title></channel></rss>", 5)
            .expect_err("empty feed should fail");
        assert!(matches!(error, FeedParseError::NoEntries));
        assert_eq!(error.to_string(), "No entries found in RSS feed");
    }

    #[test]
    fn html_to_text_keeps_unknown_entities_verbatim() {
        assert_eq!(html_to_text("<p>a &bogus; b</p>"), "a &bogus; b");
    }

    #[test]
    fn prompt_numbers_posts_and_appends_instructions() {
        let posts = vec![
            FeedPost {
                title: "One".to_string(),
                link: String::new(),
                published: String::new(),
                content: "alpha".to_string(),
            },
            FeedPost {
                title: "Two".to_string(),
                link: String::new(),
                published: String::new(),
                content: "beta".to_string(),
            },
        ];

        let prompt = compose_digest_prompt(&posts);
        assert!(prompt.contains("POST 1: One\n\nContent:\nalpha"));
        assert!(prompt.contains("POST 2: Two\n\nContent:\nbeta"));
        assert!(prompt.trim_end().ends_with("ready to send as an email body."));
    }

    #[test]
    fn html_to_text_decodes_named_entities_beyond_the_basics() {
        assert_eq!(
            html_to_text("<p>Caf&eacute; &rarr; na&iuml;ve&trade;</p>"),
            "Caf\u{e9} \u{2192} na\u{ef}ve\u{2122}"
        );
    }

    #[test]
    fn bare_ampersand_does_not_block_other_entities() {
        assert_eq!(
            html_to_text("<p>Tom & Jerry&nbsp;&mdash; fun</p>"),
            "Tom & Jerry\u{a0}\u{2014} fun"
        );
    }

    #[test]
    fn prompt_carries_editorial_requirements() {
        let prompt = compose_digest_prompt(&[]);

        assert!(prompt.starts_with(
            "I will provide you below the encoded text content for the Substack posts i have released this week."
        ));
        assert!(prompt.contains(
            "Your goal is to generate 1 new essay that pulls together the ideas of those 5 posts"
        ));
        assert!(prompt.contains(
            "use a short story to a) hook the reader and b) naturally present and illustrate the theme"
        ));
        assert!(prompt.contains("such as \"This isn't just X... - it's Y\""));
        assert!(prompt.contains("Also minimize the usage of em dashes."));
        assert!(prompt.contains("Target a 4-5 minute read (approximately 1,000-1,200 words)."));
    }
}
