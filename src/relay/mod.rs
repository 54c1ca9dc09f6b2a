pub mod broadcaster;
pub mod decode;
pub mod engine;
pub mod export;
pub mod history;
pub mod last_values;
pub mod persistence;
pub mod record;
pub mod session;
pub mod state_cache;
pub mod topic;

pub use broadcaster::Broadcaster;
pub use decode::{DeviceKey, SensorReading};
pub use engine::{Clock, Relay};
pub use export::{JsonFileExporter, SessionExporter};
pub use history::SessionReport;
pub use last_values::LastValueTable;
pub use persistence::{PersistenceQueue, PersistenceSink, WriterStats};
pub use record::{Category, ClassificationRecord};
pub use session::SessionState;
pub use state_cache::{DeviceStateCache, LiveCacheReader, LiveCacheView};
pub use topic::{MessageClass, TopicMap};
