//! DOM access for the TARA Visual Co-Pilot.
//!
//! ## Components
//!
//! - [`DomScanner`] - Turns a [`Page`](tara_protocols::Page) into a bounded,
//!   deduplicated [`DomSnapshot`]
//! - [`CommandExecutor`] - Resolves a command's target and applies it
//! - [`MemoryPage`] - In-memory page model loaded from a JSON fixture
//!
//! ## Identity
//!
//! Elements are addressed by their `id` attribute, then `name`, then a
//! derived `t-<base36>` id hashed from tag, text, role, href, type and DOM
//! path. The scanner never writes the derived id back into the page; the
//! executor recomputes it to find the live element again.

pub mod executor;
pub mod identity;
pub mod memory;
pub mod scanner;
pub mod text;

pub use executor::CommandExecutor;
pub use memory::{MemoryPage, PageEvent, PageFixture};
pub use scanner::{DomScanner, DomSnapshot};
