//! # TTML Processor: line-timed and word-timed TTML for lyric_sync
//!
//! This crate reads and writes the TTML documents produced by the lyric_sync editor:
//! one `<p begin=".." end="..">` per synchronized line, optionally split into timed
//! `<span>` words.
//!
//! The primary functions are:
//! - [`parse_ttml`]: Converts a TTML string into `ParsedLyrics` from `lyric_sync_core`.
//! - [`generate_ttml`]: Creates a TTML string from `SyncedLine` data.
//! - [`parse_ttml_word_lines`] / [`generate_word_ttml`]: The same for word-level timing.
//!
//! ## Examples
//!
//! ```rust
//! use lyric_sync_core::{LineTiming, SyncedLine, TtmlGenerationOptions};
//! use ttml_processor::{generate_ttml, parse_ttml};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let lines = vec![
//!         SyncedLine::new("Hello & goodbye").with_timing(LineTiming::Synced { begin: 1.0, end: 2.5 }),
//!         SyncedLine::new("not synced yet"),
//!     ];
//!
//!     let ttml = generate_ttml(&lines, &TtmlGenerationOptions::default())?;
//!     assert!(ttml.contains(r#"<p begin="00:00:01.00" end="00:00:02.50">Hello &amp; goodbye</p>"#));
//!     assert!(!ttml.contains("not synced yet"));
//!
//!     let parsed = parse_ttml(&ttml)?;
//!     assert_eq!(parsed.lines.len(), 1);
//!     assert_eq!(parsed.lines[0].text, "Hello & goodbye");
//!     assert_eq!(parsed.lines[0].begin(), Some(1.0));
//!
//!     Ok(())
//! }
//! ```

pub mod generator;
pub mod parser;

pub use generator::{generate_ttml, generate_word_ttml};
pub use parser::{parse_ttml, parse_ttml_word_lines};
