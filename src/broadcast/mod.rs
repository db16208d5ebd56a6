mod broadcaster;
pub use broadcaster::*;
