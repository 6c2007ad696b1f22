mod category;
mod entry;
mod method;

pub(crate) use category::{
    ColumnSpec, ExpenseItem, IncomeItem, Item, LedgerKind, UNSPECIFIED_LABEL,
};
pub(crate) use entry::{total, ExpenseEntry, IncomeEntry, LedgerEntry};
pub(crate) use method::Method;
