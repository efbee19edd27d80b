//! Datamerge MCP server.
//!
//! Exposes the Datamerge company-data API (enrichment, lookup, hierarchy,
//! contacts, lists, credits) as MCP tools over two transports: stdio (one
//! implicit session) and streamable HTTP (many concurrent sessions, one
//! isolated upstream client per session).

pub mod config;
pub mod http;
pub mod server;
pub mod session;
pub mod session_manager;
pub mod tools;
