pub mod customer;
pub mod notice;
pub mod outflow;
pub mod raw_material;
pub mod spk;

pub use customer::CustomerOption;
pub use notice::{ApprovalNotice, ProductionRequest, RequestedItem};
pub use outflow::{ItemType, OutflowFilter, OutflowRow, OutflowSummary, TypeCounts};
pub use raw_material::sanitize_raw_material;
pub use spk::{SpkInput, SpkStatus};
