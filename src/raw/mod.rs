mod str_buf;

pub use self::str_buf::{AllocError, StrBuf};
