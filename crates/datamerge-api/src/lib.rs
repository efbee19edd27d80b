//! Client library for the Datamerge company-data REST API.
//!
//! One [`DatamergeClient`] wraps one (credential, base URL) pair and is
//! immutable after construction. Asynchronous upstream operations (enrichment,
//! lookalike search, contact search/enrichment) return a [`jobs::JobHandle`]
//! that is driven to a terminal state with [`jobs::start_and_await`].

pub mod client;
pub mod error;
pub mod jobs;
pub mod normalize;

pub use client::{
    ClientOptions, CompanyRef, ContactEnrichmentQuery, ContactSearchQuery, CreditsBalance,
    DatamergeClient, EnrichmentQuery, ListSummary, LookalikeQuery,
};
pub use error::{ApiError, Result};
pub use jobs::{JobHandle, JobOutcome, JobState, JobStatus, PollOptions, classify, start_and_await};
