use crate::config::MAX_ARTICLES_PER_TICKER;
use crate::fetcher::traits::NewsSource;
use crate::model::{Article, NewsError};
use crate::parser::{FeedItem, Parser, RssParser};
use crate::sentiment::SentimentScorer;
use reqwest::Client;
use tracing::debug;

const FEED_URL: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline";

/// Headline feed with sentiment scored locally for title and summary.
pub struct YahooRssSource {
    client: Client,
    feed_url: String,
    parser: RssParser,
    scorer: SentimentScorer,
}

impl YahooRssSource {
    pub fn new(client: Client) -> Result<Self, NewsError> {
        Self::with_feed_url(client, FEED_URL)
    }

    pub fn with_feed_url(client: Client, feed_url: impl Into<String>) -> Result<Self, NewsError> {
        Ok(Self {
            client,
            feed_url: feed_url.into(),
            parser: RssParser::new()?,
            scorer: SentimentScorer::new(),
        })
    }

    pub fn to_article(&self, item: FeedItem) -> Article {
        Article {
            title_sentiment: self.scorer.score(&item.title),
            summary_sentiment: self.scorer.score(&item.summary),
            title: item.title,
            summary: item.summary,
            published_at: item.published_at,
        }
    }
}

#[async_trait::async_trait]
impl NewsSource for YahooRssSource {
    async fn fetch_recent(&self, ticker: &str, max_items: usize) -> Result<Vec<Article>, NewsError> {
        let max_items = max_items.clamp(1, MAX_ARTICLES_PER_TICKER);
        debug!("GET {} for {}", self.feed_url, ticker);

        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("s", ticker), ("region", "US"), ("lang", "en-US")])
            .send()
            .await
            .map_err(|e| if e.is_timeout() { NewsError::Timeout } else { NewsError::Http(e) })?;

        if !response.status().is_success() {
            return Err(NewsError::InvalidResponse(response.status().as_u16()));
        }
        let body = response.text().await?;
        let items = self.parser.parse(&body)?;

        Ok(items
            .into_iter()
            .take(max_items)
            .map(|item| self.to_article(item))
            .collect())
    }
}
