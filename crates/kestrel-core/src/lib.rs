pub mod archive;
pub mod config;
pub mod error;
pub mod extensions;
pub mod fingerprint;
pub mod fsutil;
pub mod lifecycle;
pub mod record;
pub mod store;

pub use archive::{ArchiveCodec, TarGzCodec};
pub use config::{AppConfig, Paths};
pub use error::{Error, Result};
pub use extensions::ExtensionResolver;
pub use fingerprint::Fingerprint;
pub use lifecycle::{
    CloneProfile, CreateProfile, ImportProfile, ProfileLifecycleManager, RemoveOutcome,
};
pub use record::{
    EngineKind, GroupRecord, ProfileKind, ProfileRecord, ProfileStatus, ProfileUpdate,
    ProxySettings,
};
pub use store::{JsonStore, StoreFile};
