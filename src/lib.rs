pub mod analytics;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod maintenance;
pub mod notify;
pub mod payments;
pub mod registry;
pub mod settings;
pub mod web;
