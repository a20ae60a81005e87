//! Tableau Server / Tableau Cloud adapter
//!
//! This module provides the [`BiServer`] contract, paging helpers, the REST
//! API models and the [`TableauServer`] client that implements the contract.

pub mod client;
pub mod models;
pub mod server;

pub use client::TableauServer;
pub use server::{collect_pages, BiServer, Page, PageRequest, ViewRequest};
