//! Track library: the data model and the filesystem scanner.
//!
//! `scan` produces `Track`s from a directory tree; the playlist is a
//! `TrackList`, an insertion-ordered collection unique by `TrackId`.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;
