// src/ingest/endpoints.rs

/// Ordered list of interchangeable provider base URLs with round-robin failover.
///
/// The failure counter is shared by the whole pool, not kept per URL.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    urls: Vec<String>,
    index: usize,
    consecutive_failures: usize,
}

impl EndpointPool {
    /// Configuration validation guarantees a non-empty list.
    ///
    /// # Panics
    ///
    /// Panics if `urls` is empty.
    pub fn new(urls: Vec<String>) -> Self {
        assert!(!urls.is_empty(), "endpoint pool needs at least one URL");
        Self {
            urls,
            index: 0,
            consecutive_failures: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.urls[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Call once per failed poll cycle: counts the failure and rotates.
    pub fn advance(&mut self) {
        self.consecutive_failures += 1;
        self.index = (self.index + 1) % self.urls.len();
    }

    /// Call once per successful poll cycle. Keeps the current index.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn failure_count(&self) -> usize {
        self.consecutive_failures
    }

    /// Every endpoint has failed twice in a row with no success in between.
    pub fn is_exhausted(&self) -> bool {
        self.consecutive_failures >= self.urls.len() * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> EndpointPool {
        EndpointPool::new((0..n).map(|i| format!("https://p{i}.test")).collect())
    }

    #[test]
    fn advance_wraps_after_n_failures() {
        let mut p = pool(3);
        assert_eq!(p.current(), "https://p0.test");
        p.advance();
        p.advance();
        assert_eq!(p.index(), 2);
        p.advance();
        assert_eq!(p.index(), 0);
        assert_eq!(p.failure_count(), 3);
        assert!(!p.is_exhausted());
    }

    #[test]
    fn exhausted_after_two_full_rounds() {
        let mut p = pool(4);
        for _ in 0..7 {
            p.advance();
        }
        assert!(!p.is_exhausted());
        p.advance();
        assert!(p.is_exhausted());
    }

    #[test]
    #[should_panic(expected = "at least one URL")]
    fn empty_pool_panics() {
        EndpointPool::new(Vec::new());
    }

    #[test]
    fn reset_keeps_index() {
        let mut p = pool(2);
        p.advance();
        p.reset();
        assert_eq!(p.failure_count(), 0);
        assert_eq!(p.current(), "https://p1.test");
    }
}
