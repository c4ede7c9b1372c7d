//! Tentative currency choices awaiting confirmation.

use crate::core::{CurrencyPair, Side};

/// Pending selector values. Never rendered directly; only the result of
/// [`PendingSelection::resolve`], committed through a switch, changes what
/// is displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSelection {
    pending_from: Option<String>,
    pending_to: Option<String>,
}

impl PendingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tentative value for one selector
    pub fn set_pending(&mut self, side: Side, value: impl Into<String>) {
        let value = value.into();
        match side {
            Side::From => self.pending_from = Some(value),
            Side::To => self.pending_to = Some(value),
        }
    }

    pub fn pending(&self, side: Side) -> Option<&str> {
        match side {
            Side::From => self.pending_from.as_deref(),
            Side::To => self.pending_to.as_deref(),
        }
    }

    /// Whether the confirm control should be shown
    pub fn requires_confirmation(&self) -> bool {
        self.pending_from.is_some() || self.pending_to.is_some()
    }

    /// Pair that confirming now would commit
    pub fn resolve(&self, committed: &CurrencyPair) -> CurrencyPair {
        CurrencyPair::new(
            self.pending_from.clone().unwrap_or_else(|| committed.buy.clone()),
            self.pending_to.clone().unwrap_or_else(|| committed.sell.clone()),
        )
    }

    /// Value a selector should display: pending if set, else committed
    pub fn display_value<'a>(&'a self, side: Side, committed: &'a CurrencyPair) -> &'a str {
        match side {
            Side::From => self.pending_from.as_deref().unwrap_or(&committed.buy),
            Side::To => self.pending_to.as_deref().unwrap_or(&committed.sell),
        }
    }

    pub fn clear(&mut self) {
        self.pending_from = None;
        self.pending_to = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mixes_pending_and_committed() {
        let committed = CurrencyPair::new("TWD", "HKD");
        let mut pending = PendingSelection::new();
        assert!(!pending.requires_confirmation());
        assert_eq!(pending.resolve(&committed), committed);

        pending.set_pending(Side::To, "JPY");
        assert!(pending.requires_confirmation());
        assert_eq!(pending.resolve(&committed), CurrencyPair::new("TWD", "JPY"));

        pending.set_pending(Side::From, "USD");
        assert_eq!(pending.resolve(&committed), CurrencyPair::new("USD", "JPY"));
        assert_eq!(pending.display_value(Side::From, &committed), "USD");
    }

    #[test]
    fn test_clear_discards_everything() {
        let committed = CurrencyPair::new("TWD", "HKD");
        let mut pending = PendingSelection::new();
        pending.set_pending(Side::From, "EUR");
        pending.clear();
        assert_eq!(pending.pending(Side::From), None);
        assert_eq!(pending.display_value(Side::From, &committed), "TWD");
        assert!(!pending.requires_confirmation());
    }
}
