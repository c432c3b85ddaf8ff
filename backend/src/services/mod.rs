//! Business logic services for the LoomTrack platform

pub mod roll;
pub mod spreadsheet;
pub mod work_order;

pub use roll::RollService;
pub use spreadsheet::SpreadsheetService;
pub use work_order::WorkOrderService;
