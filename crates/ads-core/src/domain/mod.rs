//! Domain entities - the core business objects.

mod ad;
mod page;

pub use ad::{Ad, NewAd, round_price};
pub use page::{PAGE_SIZE, PageRequest, SortOrder};
