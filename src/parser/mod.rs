// Provider payload parsing
pub mod chart_parser;
pub mod rss_parser;

use crate::model::ParserError;

pub use chart_parser::ChartParser;
pub use rss_parser::{FeedItem, RssParser};

pub trait Parser {
    type Output;

    fn parse(&self, body: &str) -> Result<Self::Output, ParserError>;
}
