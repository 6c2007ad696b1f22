use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::category::{ExpenseItem, IncomeItem, Item, UNSPECIFIED_LABEL};
use super::method::Method;

/// One line of a ledger. `C` is the category vocabulary of the ledger kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LedgerEntry<C> {
    pub(crate) id: Option<i64>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) method: Option<Method>,
    pub(crate) category: Option<C>,
    /// Category text outside the vocabulary, kept verbatim. Empty when
    /// `category` is set.
    pub(crate) unlisted_category: String,
    pub(crate) description: String,
    /// Never negative. `None` counts as zero.
    pub(crate) amount: Option<Decimal>,
    pub(crate) note: String,
}

pub(crate) type IncomeEntry = LedgerEntry<IncomeItem>;
pub(crate) type ExpenseEntry = LedgerEntry<ExpenseItem>;

impl<C: Item> LedgerEntry<C> {
    pub(crate) fn new(date: NaiveDate) -> Self {
        Self {
            id: None,
            date: Some(date),
            method: None,
            category: None,
            unlisted_category: String::new(),
            description: String::new(),
            amount: None,
            note: String::new(),
        }
    }

    pub(crate) fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// A row is worth keeping when it carries a description, an amount or any
    /// category text, listed or not.
    pub(crate) fn is_live(&self) -> bool {
        !self.description.trim().is_empty()
            || self.amount.is_some()
            || self.category_text().is_some()
    }

    /// The category as written: the vocabulary label, or the unlisted text.
    pub(crate) fn category_text(&self) -> Option<&str> {
        match self.category {
            Some(c) => Some(c.as_str()),
            None => Some(self.unlisted_category.trim()).filter(|s| !s.is_empty()),
        }
    }

    pub(crate) fn set_category(&mut self, category: Option<C>) {
        self.category = category;
        self.unlisted_category.clear();
    }

    pub(crate) fn category_label(&self) -> &'static str {
        self.category.map_or(UNSPECIFIED_LABEL, |c| c.as_str())
    }
}

/// Sum of all amounts, blanks counted as zero.
pub(crate) fn total<C: Item>(entries: &[LedgerEntry<C>]) -> Decimal {
    entries.iter().map(LedgerEntry::amount_or_zero).sum()
}
