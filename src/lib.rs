//! Opportunity map explorer.
//!
//! This crate loads a pre-computed opportunity dataset (domains, items,
//! workflows, foundations) and provides the logic behind the report views:
//! faceted filtering and search, the mindmap tree with its deterministic
//! layout and SVG rendering, and shareable `#/route?query` links.
//!
//! The binary `oppmap` exposes these as subcommands.

pub mod app;
pub mod config;
pub mod filter;
pub mod layout;
pub mod loader;
pub mod model;
pub mod report;
pub mod share;
pub mod svg;
pub mod tree;
