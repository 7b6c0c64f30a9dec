pub mod staffing;
pub mod time_slot;

pub use staffing::AssignmentAllocator;
pub use time_slot::{SlotAllocation, TimeSlotAllocator};
