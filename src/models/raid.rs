/// One RAID controller as reported by `storcli /call show all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controller {
    pub id:                   u64,
    pub model:                String,
    pub correctable_errors:   u64,
    pub uncorrectable_errors: u64,
    /// Derived from the "BBU" string: "Absent" means no battery backup,
    /// anything else counts as present.
    pub bbu_present:          bool,
    /// Older ROC firmware omits the temperature field; 0 when missing.
    pub roc_temp_celsius:     i64,
}

/// A RAID logical volume exposed by a controller.
/// `(controller, id)` is unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDrive {
    pub controller:  u64,
    pub drive_group: u64,
    pub id:          u64,
    pub raid_type:   String,
    pub state:       String,
    pub size_bytes:  u64,
}

/// A physical disk attached to a controller, directly or via enclosure.
/// `(controller, enclosure, slot)` is unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDrive {
    pub controller:    u64,
    pub enclosure:     u64,
    pub slot:          u64,
    /// None when StorCLI reports "-": the drive backs no drive group.
    pub drive_group:   Option<u64>,
    /// VD backed by this drive's group; None for hot spares and
    /// unconfigured drives.
    pub virtual_drive: Option<u64>,
    pub state:         String,
    pub size_bytes:    u64,
}
