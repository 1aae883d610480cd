// Layout: block IR, font metrics and pagination.
// Pure and CPU-bound; callers on the async runtime go through spawn_blocking.

pub mod blocks;
pub mod font_metrics;
pub mod paginate;

pub use blocks::LayoutBlock;
pub use paginate::{paginate, DrawOp, Page, PageGeometry, US_LETTER};
