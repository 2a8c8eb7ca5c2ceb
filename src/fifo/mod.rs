mod str_queue;

pub use self::str_queue::{Iter, StrQueue};
