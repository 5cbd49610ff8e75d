#![warn(missing_docs)]
//! A QA tracker that checks a Solana Firehose stream against a JSON-RPC node,
//! block by block, and reports every slot where the two disagree.

pub mod config;
pub mod engine;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
