pub mod row;
pub mod scroll_state;
pub mod target;
