//! Tour pipeline
//!
//! This module turns a position into a walkable itinerary:
//! - Stop enrichment from the archive and narrative sources
//! - Tour assembly with discovery, fan-out and distance rollup
//! - A forward-only cursor over the assembled stops
//! - A session object that owns the current tour for one conversation

pub mod assembler;
pub mod cursor;
pub mod enricher;
pub mod session;

pub use assembler::TourAssembler;
pub use cursor::TourCursor;
pub use enricher::{FALLBACK_NARRATIVE, StopEnricher};
pub use session::TourSession;
