use std::alloc::Layout;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}

// Owned byte copy of a str, allocated independently of the source.
pub struct StrBuf {
    buf: NonNull<u8>,
    len: usize,
}

unsafe impl Send for StrBuf {}
unsafe impl Sync for StrBuf {}

impl StrBuf {
    pub fn copy_of(s: &str) -> Result<Self, AllocError> {
        if s.is_empty() {
            return Ok(Self {
                buf: NonNull::dangling(),
                len: 0,
            });
        }

        let layout = Layout::array::<u8>(s.len()).map_err(|_| AllocError)?;
        let buf = match NonNull::new(unsafe { std::alloc::alloc(layout) }) {
            Some(buf) => buf,
            None => return Err(AllocError),
        };
        unsafe { std::ptr::copy_nonoverlapping(s.as_ptr(), buf.as_ptr(), s.len()) };

        Ok(Self { buf, len: s.len() })
    }

    pub fn as_str(&self) -> &str {
        // invariant: the bytes were copied from a str and never mutated
        unsafe {
            let bytes = std::slice::from_raw_parts(self.buf.as_ptr(), self.len);
            std::str::from_utf8_unchecked(bytes)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for StrBuf {
    fn drop(&mut self) {
        if self.len != 0 {
            unsafe {
                let layout = Layout::from_size_align_unchecked(self.len, 1);
                std::alloc::dealloc(self.buf.as_ptr(), layout);
            }
        }
    }
}

impl Deref for StrBuf {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for StrBuf {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for StrBuf {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for StrBuf {}

impl PartialOrd for StrBuf {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StrBuf {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Debug for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
