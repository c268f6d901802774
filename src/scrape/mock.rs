use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::PageScraper;

/// [`PageScraper`] answering from a fixed URL map. Unknown URLs scrape to `None`.
#[derive(Default)]
pub struct MockScraper {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }

    /// URLs scraped so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> Option<String> {
        self.calls.lock().push(url.to_string());
        self.pages.get(url).cloned()
    }
}
