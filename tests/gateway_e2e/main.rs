//! Gateway E2E test suite.
//!
//! Drives the full HTTP surface against mock Key Store, metadata and
//! backend servers. Backend calls are signed with static test credentials.
//!
//! Run with: cargo test --test gateway_e2e

mod test_helpers;

mod test_graphql_stores;
mod test_permissions;
mod test_send_notification;
