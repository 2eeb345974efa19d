//! plotstore is the in-memory storage engine under a telemetry plotting
//! tool. It ingests streamed or bulk-loaded (timestamp, value) samples
//! for thousands of independently named series and keeps them queryable
//! by time and by index while bounding memory under continuous
//! ingestion: chunked storage with copy-on-write sharing, constant-run
//! compression, cross-series timestamp deduplication, out-of-order
//! repair, and sliding-window eviction.
//!
//! The engine is not internally synchronized. Any number of producers
//! and one consumer may touch a series, but callers must serialize
//! every call behind one external lock; no method blocks or suspends.

#![forbid(unsafe_code)]

pub mod attr;
pub mod dataset;
pub mod error;
pub mod range;
pub mod series;
pub mod storage;
pub mod strings;
pub mod timeseries;

pub use attr::{AttributeId, AttributeMap, AttributeValue, Color, PlotGroup};
pub use dataset::DataSet;
pub use error::Error;
pub use range::Range;
pub use series::{PlotSeries, Point, PushResult};
pub use storage::{CHUNK_CAPACITY, Chunk, ChunkedArray, Element, TimestampRegistry};
pub use strings::{StringRef, StringSeries};
pub use timeseries::Timeseries;
