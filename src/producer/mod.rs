mod item_producer;
pub use item_producer::*;
