//! Latest version resolution
//!
//! Selects the one object that represents the "latest" installer from a
//! bucket listing. Everything here is pure and synchronous; listing and
//! tracking live in [`crate::storage`] and [`crate::tracking`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Filter    │────▶│   Extract   │────▶│    Rank     │
//! │  (pattern)  │     │  (semver)   │     │ (ver, time) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        │            ┌─────────────┐            │
//!        └────────────│  Resolver   │◀───────────┘
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`filter`]: Regular expression filtering of object keys
//! - [`extract`]: `major.minor.patch` token extraction
//! - [`rank`]: Two-tier ordering and winner selection
//! - [`resolver`]: Single entry point [`resolver::resolve_latest`]
//! - [`error`]: Error types for resolution and its collaborators
//! - [`types`]: `Candidate`, `ExtractedVersion` and `Winner`

pub mod error;
pub mod extract;
pub mod filter;
pub mod rank;
pub mod resolver;
pub mod types;

pub use resolver::resolve_latest;
pub use types::{Candidate, ExtractedVersion, Winner};
