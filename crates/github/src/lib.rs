//! GitHub infrastructure adapter.
//!
//! Implements the port traits defined in the [`provisioning`] crate
//! ([`OrganizationAdmin`](provisioning::OrganizationAdmin) and
//! [`PullRequestReader`](provisioning::PullRequestReader)) over the GitHub
//! REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (authentication headers, pagination, status code
//! mapping, wire formats) are handled here; the [`provisioning`] crate never
//! sees them.
//!
//! ## Module Structure
//!
//! | Module     | Responsibility                                      |
//! |------------|-----------------------------------------------------|
//! | `client`   | HTTP client, headers, error mapping                 |
//! | `models`   | Request and response bodies                         |
//! | `admin`    | `OrganizationAdmin` implementation                  |
//! | `pulls`    | `PullRequestReader` implementation                  |

mod admin;
mod client;
mod models;
mod pulls;

pub use client::{GithubClient, DEFAULT_API_URL};
