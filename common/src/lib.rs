//! Shared domain model for the RuralCart storefront: records exchanged between
//! the HTTP API and its clients, their request bodies, validation rules, and
//! the pricing policy both sides compute totals with.

pub mod category;
pub mod currency;
pub mod identity;
pub mod message;
pub mod order;
pub mod patch;
pub mod pricing;
pub mod product;
pub mod user;
pub mod validation;
