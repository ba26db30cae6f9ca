//! Reading, writing and text-converting DTM input recordings
//!
//! A DTM file is a 256-byte [`DtmHeader`] followed by one 8-byte [`ControllerState`] per
//! frame. Next to the binary format, this crate speaks a line-based text format meant for
//! editing recordings by hand. See [`Dtm`] for the entry point.
//!
//! Only the GameCube single-controller layout is modelled. Wii recordings share the header,
//! but their input records don't match [`ControllerState`].

pub mod controller;
pub mod fixed;
pub mod header;
pub mod movie;
pub mod timeline;

pub use controller::{Axis, Button, Buttons, ControllerState};
pub use header::DtmHeader;
pub use movie::Dtm;
pub use ux::u2;
