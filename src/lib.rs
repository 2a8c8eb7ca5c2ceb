pub mod fifo;
pub mod raw;

pub use self::fifo::{Iter, StrQueue};
pub use self::raw::{AllocError, StrBuf};
