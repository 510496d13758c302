//! Access to the UNFCCC greenhouse gas data interface.
//!
//! The service distinguishes parties listed in Annex I from the other
//! parties and exposes one Flexible Query API per group. [`Reader`] unifies
//! both so callers only name a party; [`CategoryReader`] queries one group
//! with filters on category, classification, measure and gas.
//!
//! Results are polars `DataFrame`s with the columns listed in
//! [`schema::record`].

pub mod assemble;
pub mod category;
pub mod config;
pub mod dimension;
pub mod error;
pub mod executor;
pub mod gas;
pub mod reader;
pub mod schema;
pub mod taxonomy;
pub mod transport;
pub mod variables;

#[cfg(feature = "python")]
mod python;

pub use category::{CategoryReader, QueryParameters};
pub use config::ReaderConfig;
pub use dimension::{Dimension, PartyCategory};
pub use error::{DiError, Result};
pub use reader::Reader;
pub use transport::{HttpTransport, Transport};
