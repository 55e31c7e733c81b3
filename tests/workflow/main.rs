//! Workflow Test Suite
//!
//! End-to-end tests through the public `custody` API: the concrete
//! scenarios, lifecycle rules, scope isolation, serial application under
//! concurrent submitters, and snapshot durability.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test workflow
//! cargo test --test workflow isolation::
//! ```

mod common;

mod concurrency;
mod durability;
mod isolation;
mod lifecycle;
mod scenarios;
