pub(crate) mod ledger;
pub(crate) mod monthly;
pub(crate) mod report;
