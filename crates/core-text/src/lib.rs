//! Text utilities shared by the edit buffer, the screen compositor, and the
//! output formatter.
//!
//! [`display`] holds the per-scalar width/ANSI primitives the specification
//! calls "text utils" (C1). [`width`] and [`segment`] add a grapheme-cluster
//! aware width engine: the edit buffer indexes by Unicode scalar value, but
//! painting a line onto the screen still needs to know that combining marks,
//! ZWJ emoji sequences and regional-indicator flag pairs occupy a single
//! terminal cell rather than the naive per-scalar sum.

pub mod display;
pub mod pathlike;
pub mod segment;
pub mod width;
#[cfg(feature = "term-probe")]
pub mod width_probe;

pub use width::egc_width;
