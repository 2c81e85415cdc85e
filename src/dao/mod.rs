/// Score ledger abstraction and shared ledger types.
pub mod ledger;
/// Process-local ledger implementation.
pub mod memory;
/// REST ledger implementation talking to the hosted profile service.
#[cfg(feature = "rest-ledger")]
pub mod rest;
