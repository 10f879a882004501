//! # floorview
//!
//! A real-time visualization client for person tracking streams.
//!
//! floorview connects to a remote tracking endpoint over a persistent
//! WebSocket, ingests an unordered stream of per-person position and
//! demographic events, and reconciles a bounded, self-expiring set of
//! visible entities against a 2D draw surface on a fixed frame cadence,
//! independent of network arrival timing.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   text frames   ┌────────────┐
//! │  transport  │ ──────────────▶ │ dispatcher │──▶ position store
//! │ (register,  │                 │ (classify, │──▶ demographic store
//! │  heartbeat) │                 │   route)   │
//! └────────────┘                 └────────────┘
//!                                       │ snapshots
//!                 33 ms tick            ▼
//!               ┌──────────┐    ┌──────────────┐     ┌─────────────┐
//!               │ renderer │◀───│  reconciler  │────▶│ DrawSurface │
//!               │ (markers)│    │   (labels)   │     │  (markers,  │
//!               └──────────┘    └──────────────┘     │   labels)   │
//!                                  5 s sweep         └─────────────┘
//! ```
//!
//! All state lives on one cooperative task ([`Floorview::run`]); there is no
//! locking and no backpressure beyond last-write-wins per person. Records
//! expire on independent 10-second one-shot timers keyed by record id, so a
//! stale timer firing after a replacement is a guaranteed no-op.
//!
//! ## Example
//!
//! ```rust,no_run
//! use floorview::{Floorview, NullSurface, VizConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), floorview::VizError> {
//!     let config = VizConfig::builder()
//!         .token("your_token_here")
//!         .locations(vec![21])
//!         .build();
//!
//!     let (_session, rx) = floorview::transport::connect(&config).await?;
//!     let mut viz = Floorview::new(&config, NullSurface);
//!     viz.run(rx).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod labels;
pub mod render;
pub mod runtime;
pub mod scale;
pub mod store;
pub mod surface;
pub mod transport;

pub use config::{VizConfig, VizConfigBuilder};
pub use dispatch::{Dispatcher, ExpiryKey, IngestedRecord, RecordKind};
pub use labels::{LabelRecord, LabelReconciler};
pub use render::Renderer;
pub use runtime::Floorview;
pub use scale::LinearScale;
pub use store::{
    DemographicData, ExpiringStore, Gender, PersonId, PositionData, Record, RecordId,
};
pub use surface::{DrawSurface, LabelHandle, NullSurface, RecordingSurface};
pub use transport::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unified error type for floorview operations.
///
/// Recoverable stream faults (malformed messages, unknown types, missing
/// join targets) are logged and swallowed inside the core and never surface
/// here; this type covers the connect/encode path only.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// WebSocket connect or send failure
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Outbound control message could not be encoded
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        DrawSurface, Floorview, Gender, LabelHandle, LabelRecord, NullSurface, PersonId,
        RecordId, RecordingSurface, VizConfig, VizError,
    };
}
