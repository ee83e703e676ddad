pub mod item;
pub mod lane;
pub mod status;
pub mod timeline;

pub use item::{Item, ItemId, ItemInsert, RequestMeta};
pub use lane::{Lane, LaneId};
pub use status::{StatusCategory, StatusClass, StatusClassTable};
pub use timeline::{Snapshot, TimelineModel};
