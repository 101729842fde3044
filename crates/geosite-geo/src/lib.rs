//! Geographic index for geosite.
//!
//! This crate provides:
//! - [`GeoRecord`]: One row of the geographic source (city, state, zip codes)
//! - [`GeoIndex`]: Immutable lookups for states, cities and zip codes
//! - [`load_sqlite`]: Reads every record from a `SQLite` `Cities` table
//!
//! The index is built once and only read afterwards. Refreshing means building
//! a new [`GeoIndex`] from a fresh load and swapping it in wholesale.
//!
//! # Example
//!
//! ```
//! use geosite_geo::{GeoIndex, GeoRecord};
//!
//! let index = GeoIndex::from_records([GeoRecord::new(
//!     "Austin",
//!     "TX",
//!     "Texas",
//!     "73301",
//!     "73301, 73344",
//! )]);
//!
//! assert!(index.state_exists("tx"));
//! assert_eq!(index.state_full_name("TX"), Some("Texas"));
//! assert_eq!(index.zip_codes_for_city("austin"), vec!["73301", "73344"]);
//! ```

mod index;
mod record;
mod source;

pub use index::{CityInfo, GeoIndex};
pub use record::GeoRecord;
pub use source::{GeoError, load_sqlite};
