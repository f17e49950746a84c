pub mod check;
pub mod error;
pub mod key;
pub mod metadata;
pub mod partitions;
pub mod policy;
pub mod repository;
pub mod snap;

// Re-export commonly used types
pub use check::AssetCheckNodeSnap;
pub use error::CoreError;
pub use key::{AssetCheckKey, AssetKey, EntityKey};
pub use metadata::{MetadataMap, MetadataValue};
pub use partitions::{PartitionMapping, PartitionsSnap};
pub use policy::{
    AutoMaterializePolicy, AutoMaterializePolicyType, AutomationConditionSnap, BackfillPolicy,
    FreshnessPolicy,
};
pub use repository::{
    CodeLocationEntry, CodeLocationSnapshot, InstigatorHandle, RepositoryHandle,
    RepositorySnapshot, ScheduleSnap, SensorSnap, WorkspaceSnapshot,
};
pub use snap::{AssetNodeSnap, AssetParentEdge, ExecutionType, DEFAULT_GROUP_NAME};
