use crate::raw::{AllocError, StrBuf};

use std::alloc::Layout;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ptr::NonNull;

struct Node {
    value: StrBuf,
    next: Option<NonNull<Node>>,
}

impl Node {
    fn alloc(value: StrBuf, next: Option<NonNull<Node>>) -> Result<NonNull<Self>, AllocError> {
        let layout = Layout::new::<Node>();
        let ptr = match NonNull::new(unsafe { std::alloc::alloc(layout) } as *mut Node) {
            Some(ptr) => ptr,
            // `value` drops here, releasing the copy
            None => return Err(AllocError),
        };
        unsafe { ptr.as_ptr().write(Self { value, next }) };
        Ok(ptr)
    }

    // cond: ptr came from Node::alloc and its value was already dropped or moved out
    unsafe fn dealloc(ptr: NonNull<Self>) {
        let layout = Layout::new::<Node>();
        std::alloc::dealloc(ptr.as_ptr() as *mut u8, layout);
    }

    // cond: ptr came from Node::alloc and was not freed
    unsafe fn consume(ptr: NonNull<Self>) -> StrBuf {
        let value = std::ptr::read(&ptr.as_ref().value);
        Node::dealloc(ptr);
        value
    }
}

// Singly linked FIFO over owned string copies.
pub struct StrQueue {
    head: Option<NonNull<Node>>,
    tail: Option<NonNull<Node>>,
    len: usize,
    // invariant: len == 0 iff head and tail are both None;
    // the chain from head has exactly `len` nodes, ends at tail,
    // and tail's next is None
}

unsafe impl Send for StrQueue {}
unsafe impl Sync for StrQueue {}

impl StrQueue {
    pub fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn front(&self) -> Option<&str> {
        self.head.map(|ptr| unsafe { (*ptr.as_ptr()).value.as_str() })
    }

    pub fn push_front(&mut self, value: &str) -> Result<(), AllocError> {
        let value = StrBuf::copy_of(value)?;
        let node = Node::alloc(value, self.head)?;

        if self.head.is_none() {
            self.tail = Some(node);
        }
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    pub fn push_back(&mut self, value: &str) -> Result<(), AllocError> {
        let value = StrBuf::copy_of(value)?;
        let node = Node::alloc(value, None)?;

        match self.tail {
            None => self.head = Some(node),
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
        }
        self.tail = Some(node);
        self.len += 1;
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<StrBuf> {
        let ptr = self.head?;
        self.head = unsafe { ptr.as_ref().next };
        self.len -= 1;
        if self.head.is_none() {
            self.tail = None;
        }
        Some(unsafe { Node::consume(ptr) })
    }

    // Removes the front value and copies at most buf.len() - 1 of its bytes
    // into buf, followed by a NUL terminator. Truncation is silent and cuts
    // at a byte boundary. Returns false if the queue is empty.
    pub fn pop_front_into(&mut self, buf: &mut [u8]) -> bool {
        let value = match self.pop_front() {
            Some(value) => value,
            None => return false,
        };

        if let Some(cap) = buf.len().checked_sub(1) {
            let n = value.len().min(cap);
            buf[..n].copy_from_slice(&value.as_bytes()[..n]);
            buf[n] = 0;
        }
        true
    }

    pub fn clear(&mut self) {
        let mut cur = self.head;
        self.head = None;
        self.tail = None;
        self.len = 0;
        while let Some(mut ptr) = cur {
            unsafe {
                cur = ptr.as_ref().next;
                std::ptr::drop_in_place(&mut ptr.as_mut().value);
                Node::dealloc(ptr);
            }
        }
    }

    // In-place reversal: relinks the existing nodes, allocates nothing.
    pub fn reverse(&mut self) {
        if self.len < 2 {
            return;
        }

        let mut prev = None;
        let mut cur = self.head;
        while let Some(mut ptr) = cur {
            unsafe {
                cur = ptr.as_ref().next;
                ptr.as_mut().next = prev;
            }
            prev = Some(ptr);
        }
        self.tail = self.head;
        self.head = prev;
    }

    // Stable ascending sort by byte order. Bottom-up merge over the node
    // chain: nodes are only relinked, never reallocated.
    pub fn sort(&mut self) {
        if self.len < 2 {
            return;
        }

        let mut width = 1;
        while width < self.len {
            let mut rest = self.head;
            let mut sorted_head = None;
            let mut sorted_tail: Option<NonNull<Node>> = None;

            while let Some(first) = rest {
                let second = unsafe { split_after(first, width) };
                rest = match second {
                    Some(second) => unsafe { split_after(second, width) },
                    None => None,
                };

                let (head, tail) = unsafe { merge(Some(first), second) };
                match sorted_tail {
                    None => sorted_head = head,
                    Some(mut t) => unsafe { t.as_mut().next = head },
                }
                sorted_tail = tail;
            }

            self.head = sorted_head;
            self.tail = sorted_tail;
            width *= 2;
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head,
            len: self.len,
            _marker: PhantomData,
        }
    }
}

// cond: chain starts a valid None-terminated chain
// Cuts the chain after at most `n` nodes and returns the detached remainder.
unsafe fn split_after(chain: NonNull<Node>, n: usize) -> Option<NonNull<Node>> {
    let mut ptr = chain;
    for _ in 1..n {
        match ptr.as_ref().next {
            Some(next) => ptr = next,
            None => return None,
        }
    }
    ptr.as_mut().next.take()
}

// cond: a and b are valid None-terminated sorted chains
// Merges the chains, taking from `a` on ties so equal values keep their
// relative order. Returns the head and tail of the merged chain.
unsafe fn merge(
    mut a: Option<NonNull<Node>>,
    mut b: Option<NonNull<Node>>,
) -> (Option<NonNull<Node>>, Option<NonNull<Node>>) {
    let mut head = None;
    let mut tail: Option<NonNull<Node>> = None;

    loop {
        let mut node = match (a, b) {
            (None, None) => break,
            (Some(x), None) => {
                a = x.as_ref().next;
                x
            }
            (None, Some(y)) => {
                b = y.as_ref().next;
                y
            }
            (Some(x), Some(y)) => {
                if x.as_ref().value <= y.as_ref().value {
                    a = x.as_ref().next;
                    x
                } else {
                    b = y.as_ref().next;
                    y
                }
            }
        };

        node.as_mut().next = None;
        match tail {
            None => head = Some(node),
            Some(mut t) => t.as_mut().next = Some(node),
        }
        tail = Some(node);
    }

    (head, tail)
}

impl Drop for StrQueue {
    fn drop(&mut self) {
        self.clear()
    }
}

impl fmt::Debug for StrQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// ------------------------------------------
// begin: Iter

pub struct Iter<'a> {
    next: Option<NonNull<Node>>,
    len: usize,
    _marker: PhantomData<&'a StrQueue>,
}

unsafe impl Send for Iter<'_> {}
unsafe impl Sync for Iter<'_> {}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let ptr = self.next?;
        self.len -= 1;
        unsafe {
            self.next = ptr.as_ref().next;
            Some((*ptr.as_ptr()).value.as_str())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a> IntoIterator for &'a StrQueue {
    type Item = &'a str;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl ExactSizeIterator for Iter<'_> {
    fn len(&self) -> usize {
        self.len
    }
}

impl FusedIterator for Iter<'_> {}

// end: Iter
// ------------------------------------------
