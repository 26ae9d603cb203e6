//! # Sitedraft Workspace
//!
//! Session-level services around the editor core: persistence of the
//! authoring state, the live preview bridge and asset uploads.
//!
//! ```text
//!   UI ──→ AuthoringSession ──→ AuthoringState (sitedraft-editor)
//!               │   │
//!               │   └──→ StateStorage  (PersistedState snapshot)
//!               └──────→ PreviewBridge ──→ preview surface
//! ```

pub mod persistence;
pub mod preview;
pub mod session;
pub mod uploads;

pub use persistence::{PersistedState, PERSIST_VERSION};
pub use preview::{
    preview_channel, ChannelError, MpscPreviewChannel, Navigation, PreviewBridge, PreviewChannel,
    PreviewMessage, PreviewMirror, PreviewReceiver,
};
pub use session::{AuthoringSession, SessionError, SessionMode, SessionOptions, DEFAULT_NAMESPACE};
pub use uploads::{
    upload_asset, AssetUploader, DimensionProbe, HeaderProbe, ProbeError, UploadError,
    UploadRequest, UploadedObject,
};
