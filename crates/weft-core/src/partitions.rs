//! Partitioning snapshots.
//!
//! A [`PartitionsSnap`] describes how an asset's data is divided into
//! addressable partitions; a [`PartitionMapping`] describes how a dependent
//! asset's partitions correspond to a parent's. Both are closed enums carried
//! opaquely through the graph.

use serde::{Deserialize, Serialize};

/// Snapshot of an asset's partitions definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionsSnap {
    /// A fixed, explicitly enumerated set of partition keys.
    Static {
        /// The partition keys, in definition order.
        partition_keys: Vec<String>,
    },
    /// Time-window partitions generated from a cron cadence.
    TimeWindow {
        /// Cron expression producing window boundaries.
        cron_schedule: String,
        /// Epoch seconds of the first window's start.
        start_timestamp: f64,
        /// strftime format of the partition key.
        fmt: String,
    },
    /// Partitions added at runtime under a named dynamic definition.
    Dynamic {
        /// Name of the dynamic partitions definition.
        name: String,
    },
}

impl PartitionsSnap {
    /// Returns the kind label of this definition.
    pub fn kind(&self) -> &'static str {
        match self {
            PartitionsSnap::Static { .. } => "static",
            PartitionsSnap::TimeWindow { .. } => "time_window",
            PartitionsSnap::Dynamic { .. } => "dynamic",
        }
    }
}

/// How a dependent asset's partitions map onto a parent asset's partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionMapping {
    /// Partition N depends on the parent's partition N.
    Identity,
    /// Every partition depends on all of the parent's partitions.
    AllPartitions,
    /// Every partition depends on the parent's last partition.
    LastPartition,
    /// Time-window partitions depend on a window offset in the parent.
    TimeWindow {
        /// Offset of the window start, in partitions.
        start_offset: i32,
        /// Offset of the window end, in partitions.
        end_offset: i32,
    },
}
