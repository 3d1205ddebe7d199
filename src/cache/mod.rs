mod accountant;
mod category;
mod clock;
mod config;
mod core;
mod entry;
mod maintenance;
mod metrics;
mod persistence;
mod policy;
mod protection;
mod size;
mod state;
mod stats;
mod store;

pub use accountant::{DiskProbe, FixedDiskProbe, StatvfsProbe};
pub use category::Category;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, CategoryConfig, CategorySettings, RetentionPolicy};
pub use self::core::{Cache, CacheBuilder};
pub use entry::{Entry, EntryMetadata};
pub use maintenance::MaintenanceReport;
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use persistence::{IndexSummary, MetadataIndex};
pub use size::{Artifact, CacheWeight};
pub use stats::{CacheStats, CategoryStats, EntryInfo};
pub use store::{CategoryStore, StoreCounters};
