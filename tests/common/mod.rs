//! Shared fixtures for integration tests: a scripted transport and a
//! builder for search-result pages.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use url::Url;

use marketplace_search_lib::infrastructure::{AppConfig, PageTransport, TransportError, TransportResponse};

/// What the fake remote does for one request
#[derive(Debug, Clone)]
pub enum Reply {
    Page { status: u16, body: String },
    Fail(TransportError),
    /// Never answers; only the per-attempt timeout ends the request
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Page {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Page {
            status,
            body: body.into(),
        }
    }
}

type Responder = dyn Fn(&Url, usize) -> Reply + Send + Sync;

/// In-memory `PageTransport` recording every attempt
pub struct FakeTransport {
    responder: Box<Responder>,
    calls: Mutex<Vec<(Instant, Url)>>,
}

impl FakeTransport {
    /// Answer with `responder(url, zero_based_attempt)`
    pub fn from_fn(responder: impl Fn(&Url, usize) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(reply: Reply) -> Arc<Self> {
        Self::from_fn(move |_, _| reply.clone())
    }

    /// Replay `replies` in order, repeating the last one
    pub fn sequence(replies: Vec<Reply>) -> Arc<Self> {
        Self::from_fn(move |_, attempt| replies[attempt.min(replies.len() - 1)].clone())
    }

    pub fn attempts(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }

    pub fn requested_urls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().iter().map(|(_, url)| url.clone()).collect()
    }
}

#[async_trait]
impl PageTransport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), url.clone()));
            calls.len() - 1
        };

        match (self.responder)(url, attempt) {
            Reply::Page { status, body } => Ok(TransportResponse {
                status,
                final_url: url.clone(),
                body,
            }),
            Reply::Fail(error) => Err(error),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// Defaults with a small, deterministic retry budget
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.http.timeout_seconds = 2;
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 100;
    config.retry.max_delay_ms = 5_000;
    config.retry.backoff_multiplier = 2.0;
    config.retry.jitter_ms = 0;
    config
}

/// One result entry in the current marketplace layout
#[derive(Debug, Clone)]
pub struct Block {
    pub asin: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl Block {
    /// A block with every field present
    pub fn complete(asin: &str, title: &str, price: &str) -> Self {
        Self {
            asin: asin.to_string(),
            title: Some(title.to_string()),
            price: Some(price.to_string()),
            rating: Some("4.5 out of 5 stars".to_string()),
            image: Some(format!("https://m.media-amazon.com/images/I/{asin}.jpg")),
            link: Some(format!("/product-{asin}/dp/{asin}/ref=sr_1_1")),
        }
    }

    pub fn without_title(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn without_price(mut self) -> Self {
        self.price = None;
        self
    }

    pub fn without_rating(mut self) -> Self {
        self.rating = None;
        self
    }

    pub fn render(&self) -> String {
        let mut html = format!(
            r#"<div class="s-result-item s-asin" data-asin="{}" data-component-type="s-search-result">"#,
            self.asin
        );

        if let Some(image) = &self.image {
            html.push_str(&format!(r#"<img class="s-image" src="{image}" alt="">"#));
        }
        if let Some(link) = &self.link {
            html.push_str(&format!(r#"<a class="a-link-normal s-no-outline" href="{link}">view</a>"#));
        }
        if let Some(title) = &self.title {
            html.push_str(&format!(r#"<h2 class="a-size-medium"><span class="a-text-normal">{title}</span></h2>"#));
        }
        if let Some(rating) = &self.rating {
            html.push_str(&format!(
                r#"<i class="a-icon a-icon-star-small"><span class="a-icon-alt">{rating}</span></i>"#
            ));
        }
        if let Some(price) = &self.price {
            html.push_str(&format!(
                r#"<span class="a-price"><span class="a-price-whole">{price}<span class="a-price-decimal">.</span></span><span class="a-price-fraction">99</span></span>"#
            ));
        }

        html.push_str("</div>");
        html
    }
}

/// A search-results page wrapping `blocks` in document order
pub fn results_page(blocks: &[Block]) -> String {
    let entries: String = blocks.iter().map(Block::render).collect();
    format!(
        r#"<!doctype html><html><head><title>Amazon.com : search</title></head>
<body><div class="s-main-slot s-result-list">
<div class="s-result-item s-widget" data-component-type="s-messaging-widget-results-header">Results</div>
{entries}
</div></body></html>"#
    )
}

/// A page with no result entries at all
pub fn no_results_page(keyword: &str) -> String {
    format!(
        r#"<!doctype html><html><body><div class="s-main-slot">
<div class="s-no-outline">No results for {keyword}.</div>
</div></body></html>"#
    )
}

/// A bot-check interstitial
pub fn robot_check_page() -> String {
    r#"<!doctype html><html><head><title>Robot Check</title></head>
<body><form action="/errors/validateCaptcha">
<p>Type the characters you see in this image:</p>
</form></body></html>"#
        .to_string()
}
