//! Price histories keyed by symbol.

/// Price histories in source order.
///
/// A symbol may be present without prices (a failed or empty fetch); the
/// estimator treats that the same as an absent symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    entries: Vec<(String, Option<Vec<f64>>)>,
}

impl PriceHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the prices for `symbol`, keeping its first position.
    pub fn insert(&mut self, symbol: impl Into<String>, prices: Vec<f64>) {
        self.set(symbol.into(), Some(prices));
    }

    /// Records `symbol` as having no usable prices.
    pub fn mark_missing(&mut self, symbol: impl Into<String>) {
        self.set(symbol.into(), None);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, symbol: impl Into<String>, prices: Vec<f64>) -> Self {
        self.insert(symbol, prices);
        self
    }

    fn set(&mut self, symbol: String, prices: Option<Vec<f64>>) {
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = prices,
            None => self.entries.push((symbol, prices)),
        }
    }

    /// Prices for `symbol`, if any.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&[f64]> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .and_then(|(_, p)| p.as_deref())
    }

    /// Number of symbols, including those without prices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no symbols are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(symbol, prices)` in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&[f64]>)> {
        self.entries
            .iter()
            .map(|(s, p)| (s.as_str(), p.as_deref()))
    }

    /// Restricts and reorders the history to `symbols`.
    ///
    /// Symbols without an entry come back marked missing.
    #[must_use]
    pub fn aligned_to<S: AsRef<str>>(&self, symbols: &[S]) -> Self {
        let entries = symbols
            .iter()
            .map(|s| {
                let symbol = s.as_ref();
                (symbol.to_string(), self.get(symbol).map(<[f64]>::to_vec))
            })
            .collect();
        Self { entries }
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<f64>)> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = (S, Vec<f64>)>>(iter: I) -> Self {
        let mut history = Self::new();
        for (symbol, prices) in iter {
            history.insert(symbol, prices);
        }
        history
    }
}
