//! UTF-8 decoding, glyph segmentation and console text utilities.
//!
//! Everything here works on raw bytes or `&str` without delegating the
//! segmentation rules to a Unicode property crate: a glyph is a base
//! character plus any trailing combining marks, and its display width is
//! decided by the base character alone.

pub mod case;
pub mod codec;
pub mod convert;
pub mod error;
pub mod lines;
pub mod segment;
pub mod shorten;
pub mod width;
pub mod wrap;

pub use codec::{ByteSeq, decode_all, decode_one, is_well_formed, repair, to_str};
pub use error::{Error, Result};
pub use segment::{Glyph, glyphs, is_combining, to_glyphs};
pub use shorten::{ELLIPSIS, shorten};
pub use width::{character_length, display_width};
