// RSS headline feed parsing
use crate::model::ParserError;
use crate::parser::Parser;
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// One `<item>` of a feed, with markup stripped from title and summary.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

pub struct RssParser {
    item: Selector,
    title: Selector,
    description: Selector,
    pub_date: Selector,
}

fn selector(css: &str) -> Result<Selector, ParserError> {
    Selector::parse(css).map_err(|e| ParserError::Document(e.to_string()))
}

/// Text content of an HTML fragment, whitespace collapsed.
pub fn strip_html(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn child_text(item: &ElementRef, sel: &Selector) -> Option<String> {
    item.select(sel)
        .next()
        .map(|el| el.text().collect::<String>())
        .map(|raw| strip_html(&raw))
}

impl RssParser {
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self {
            item: selector("item")?,
            title: selector("title")?,
            description: selector("description")?,
            pub_date: selector("pubdate")?,
        })
    }
}

impl Parser for RssParser {
    type Output = Vec<FeedItem>;

    /// Items come back in feed order. Items without a title are skipped.
    fn parse(&self, body: &str) -> Result<Vec<FeedItem>, ParserError> {
        if !body.contains("<rss") && !body.contains("<channel") {
            return Err(ParserError::Document("not an RSS feed".into()));
        }
        // The HTML tree builder drops CDATA sections outside foreign content.
        let body = body.replace("<![CDATA[", "").replace("]]>", "");
        let document = Html::parse_document(&body);

        let items = document
            .select(&self.item)
            .filter_map(|item| {
                let title = child_text(&item, &self.title).filter(|t| !t.is_empty())?;
                Some(FeedItem {
                    title,
                    summary: child_text(&item, &self.description).unwrap_or_default(),
                    published_at: child_text(&item, &self.pub_date).and_then(|d| parse_datetime(&d)),
                })
            })
            .collect();

        Ok(items)
    }
}
