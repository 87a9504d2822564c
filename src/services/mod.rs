pub mod data_persistance;
pub mod droid;
pub mod follow_scraper;
pub mod page;
pub mod scroller;
pub mod sheet_sink;

#[cfg(test)]
pub(crate) mod testing;

pub use data_persistance::*;
pub use droid::*;
pub use follow_scraper::*;
pub use page::*;
pub use scroller::*;
pub use sheet_sink::*;
