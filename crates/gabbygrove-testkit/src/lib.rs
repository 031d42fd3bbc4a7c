//! # Gabby Grove Testkit
//!
//! Testing utilities for Gabby Grove.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Recorded wire bytes that every implementation must reproduce
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A deterministic author with a stepping clock
//!
//! ## Golden Vectors
//!
//! ```rust
//! use gabbygrove_testkit::vectors::{golden_messages, verify_golden_messages};
//!
//! assert_eq!(golden_messages().len(), 3);
//! for (name, matches, _hex) in verify_golden_messages() {
//!     assert!(matches, "{name} diverged");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use gabbygrove_testkit::generators::EntryParams;
//!
//! proptest! {
//!     #[test]
//!     fn entries_verify(params: EntryParams) {
//!         let (tr, _) = params.encode().unwrap();
//!         prop_assert!(tr.verify(None));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use gabbygrove_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let chain = fixture.make_chain(3);
//! assert_eq!(chain.len(), 3);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::EntryParams;
pub use vectors::{golden_messages, verify_golden_messages, GoldenMessage, DEAD_SEED};
