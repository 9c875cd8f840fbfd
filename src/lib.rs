//! # lyric_sync: manual lyrics synchronization engine
//!
//! Load plain text (or an existing LRC/TTML file), tap along with the audio to give
//! every line a begin and end time, review formatting issues, then export to LRC,
//! TTML or plain text.
//!
//! - [`store`]: the ordered line store, text reflow, split and merge.
//! - [`sync`]: the tap-to-mark synchronizer, segment audition, playback tracking and
//!   word-level tapping, all driven through the [`sync::media::MediaPort`] trait.
//! - [`converter`]: format import/export and the formatting analyzer.
//! - [`session`]: an [`EditorSession`] tying the pieces together with draft autosave.
//!
//! ## Examples
//!
//! ```rust
//! use lyric_sync::{AppConfig, EditorSession, LyricFormat, MemoryDraftStore};
//! use lyric_sync::sync::media::{MediaPort, SimulatedMedia};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = EditorSession::new(AppConfig::default(), MemoryDraftStore::new());
//!     let mut media = SimulatedMedia::new(Some(60.0));
//!     session.load_text("First line\nSecond line");
//!
//!     media.play()?;
//!     for step in [1.0, 1.5, 0.5, 2.0] {
//!         media.advance(step);
//!         session.mark(&media);
//!     }
//!
//!     assert!(session.all_lines_synced());
//!     assert_eq!(
//!         session.export(LyricFormat::Lrc)?,
//!         "[00:01.00]First line\n[00:03.00]Second line\n[00:05.00]"
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod draft;
pub mod error;
pub mod session;
pub mod store;
pub mod sync;

pub use config::AppConfig;
pub use draft::{Draft, DraftStore, JsonFileDraftStore, MemoryDraftStore};
pub use error::{LyricSyncError, Result};
pub use session::EditorSession;
pub use store::{EditFocus, LineStore};

pub use lyric_sync_core::{LineId, LineTiming, LyricFormat, SyncPhase, SyncedLine};
