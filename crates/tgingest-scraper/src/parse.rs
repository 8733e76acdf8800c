//! HTML parsing for channel preview pages.
//!
//! All functions here are synchronous and return owned data, so the parsed
//! document never lives across an `.await`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, Selector};

static MESSAGE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.tgme_widget_message[data-post]").expect("valid message selector")
});
static HEADER_TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".tgme_header_title").expect("valid header selector"));
static TEXT_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.tgme_widget_message_text").expect("valid text selector")
});
static VIEWS_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.tgme_widget_message_views").expect("valid views selector")
});
static META_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.tgme_widget_message_meta").expect("valid meta selector")
});
static AUTHOR_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.tgme_widget_message_from_author").expect("valid author selector")
});
static TIME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time").expect("valid time selector"));
static PHOTO_WRAP_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.tgme_widget_message_photo_wrap").expect("valid photo selector")
});

static BACKGROUND_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image\s*:\s*url\(\s*['"]?([^'")]+?)['"]?\s*\)"#)
        .expect("valid background-image regex")
});
static SEQUENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)$").expect("valid sequence regex"));

/// Post identifiers and the channel title found on a preview listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub channel_name: Option<String>,
    /// `data-post` values (`channel/sequence`) in document order.
    pub post_ids: Vec<String>,
}

/// An image wrapper with a background image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    /// Ordinal of the wrapper among all wrappers of the post.
    pub index: usize,
    pub url: String,
}

/// Fields of a single post container. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPost {
    pub message_text: String,
    pub views: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<String>,
    pub photos: Vec<PhotoRef>,
}

#[must_use]
pub fn parse_listing(html: &str) -> Listing {
    let doc = Html::parse_document(html);

    let channel_name = doc
        .select(&HEADER_TITLE_SEL)
        .next()
        .and_then(trimmed_text);

    let post_ids = doc
        .select(&MESSAGE_SEL)
        .filter_map(|el| el.value().attr("data-post"))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    Listing {
        channel_name,
        post_ids,
    }
}

/// Numeric suffix of a `channel/sequence` identifier.
#[must_use]
pub fn sequence_of(post_id: &str) -> Option<u64> {
    SEQUENCE_RE
        .captures(post_id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses the container whose `data-post` equals `data_post` exactly.
///
/// Returns `None` when the page holds no such container, e.g. when the post was
/// deleted and the page only shows its neighbours.
#[must_use]
pub fn parse_post(html: &str, data_post: &str) -> Option<ParsedPost> {
    let doc = Html::parse_document(html);
    let container = doc
        .select(&MESSAGE_SEL)
        .find(|el| el.value().attr("data-post") == Some(data_post))?;

    let message_text = container
        .select(&TEXT_SEL)
        .next()
        .map(body_text)
        .unwrap_or_default();

    let views = container
        .select(&VIEWS_SEL)
        .next()
        .and_then(trimmed_text);

    let (author, timestamp) = match container.select(&META_SEL).next() {
        Some(meta) => (
            meta.select(&AUTHOR_SEL).next().and_then(trimmed_text),
            meta.select(&TIME_SEL)
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .map(str::to_string),
        ),
        None => (None, None),
    };

    let photos = container
        .select(&PHOTO_WRAP_SEL)
        .enumerate()
        .filter_map(|(index, wrap)| {
            let style = wrap.value().attr("style")?;
            background_image_url(style).map(|url| PhotoRef { index, url })
        })
        .collect();

    Some(ParsedPost {
        message_text,
        views,
        author,
        timestamp,
        photos,
    })
}

/// Extracts the URL from a `background-image:url(...)` declaration.
#[must_use]
pub fn background_image_url(style: &str) -> Option<String> {
    BACKGROUND_URL_RE
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
}

fn trimmed_text(el: ElementRef<'_>) -> Option<String> {
    let text = el.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Text of the message body with inline emoji images removed.
///
/// `<br>` becomes a newline; everything else is concatenated in document order.
fn body_text(body: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in body.descendants() {
        match node.value() {
            Node::Text(t) => {
                let in_emoji = node
                    .ancestors()
                    .take_while(|a| a.id() != body.id())
                    .any(|a| a.value().as_element().is_some_and(is_emoji));
                if !in_emoji {
                    text.push_str(t);
                }
            }
            Node::Element(el) if el.name() == "br" => text.push('\n'),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn is_emoji(el: &Element) -> bool {
    el.name() == "i" && el.classes().any(|c| c == "emoji")
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
