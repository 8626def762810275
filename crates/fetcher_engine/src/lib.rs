//! Fetcher engine: network transfer, file saving and effect execution.
mod engine;
mod save;
mod transport;
mod types;

pub use engine::{EngineHandle, SAVE_FAILURE_MESSAGE};
pub use save::{ensure_output_dir, extension_for, file_name_for, DownloadTrigger, SaveError};
pub use transport::{
    ChannelProgressSink, ProgressSink, ReqwestTransport, Transport, TransportSettings,
    DEFAULT_ENDPOINT,
};
pub use types::{EngineEvent, FailureKind, TransportError};
