//! CSV clip lists turned into bookmark playlists or clip archives.
//!
//! Rows flow through [`csv_rows`] and [`timecode`] into a [`table::ClipTable`],
//! which is rendered by [`playlist`] or cut into segments by [`archive`].

pub mod archive;
pub mod csv_rows;
pub mod error;
pub mod extract;
pub mod playlist;
pub mod request;
pub mod table;
pub mod timecode;

pub use error::ClipError;
