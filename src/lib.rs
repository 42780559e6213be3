#[path = "core/timefmt.rs"]
pub mod timefmt;

#[path = "core/milestone.rs"]
pub mod milestone;

#[path = "core/params.rs"]
pub mod params;

#[path = "core/universe.rs"]
pub mod universe;

pub mod registry;
