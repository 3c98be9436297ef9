//! Client side of the relay: the upload/run session, the HTTP client that
//! talks to `/api/cowify`, and the small page affordances (copy-to-clipboard
//! and scroll reveal) modelled as plain state machines.

pub mod api;
pub mod copy;
pub mod reveal;
pub mod session;

pub use api::{HttpRelayClient, RelayApi};
pub use copy::{
    Clipboard, ClipboardChain, ClipboardError, CopyControl, CopyNote, CopyOutcome, MemoryClipboard,
    REVERT_DELAY,
};
pub use reveal::{IntersectionEntry, RevealObserver, REVEAL_THRESHOLD};
pub use session::{
    DirectorySink, DownloadSink, MemoryPreviewStore, Phase, PreviewStore, PreviewUrl, Status,
    UploadSession, DOWNLOAD_FILE_NAME,
};
