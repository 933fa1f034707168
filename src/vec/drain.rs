use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;
use core::slice;

use crate::capacity::Index;
use crate::storage::slots;

use super::buffer::VecBuffer;
use super::index_panic;

/// An iterator which takes a range of items out of a `Vec`.
///
/// Dropping the iterator drops whatever it did not yield, then shifts the
/// items after the range down to close the hole.
pub struct Drain<'d, B: VecBuffer> {
    /// Slots vacated so far, starting where the range began.
    hole: Range<usize>,
    pending: Range<usize>,
    tail: usize,
    buf: &'d mut B,
}

impl<'d, B: VecBuffer> Drain<'d, B> {
    pub(super) fn new(buf: &'d mut B, range: Range<usize>) -> Self {
        let len = buf.length().to_usize();
        if range.start > range.end || range.end > len {
            index_panic();
        }
        if len > 0 {
            // the range and the tail belong to the iterator until it is dropped
            unsafe { buf.set_length(B::Index::from_usize(range.start)) };
        }
        Self {
            hole: range.clone(),
            tail: len - range.end,
            pending: range,
            buf,
        }
    }

    /// The items not yet yielded.
    pub fn as_slice(&self) -> &[B::Item] {
        let data = unsafe { self.buf.data_ptr().add(self.pending.start) };
        unsafe { slice::from_raw_parts(data, self.pending.len()) }
    }

    /// The items not yet yielded, writable.
    pub fn as_mut_slice(&mut self) -> &mut [B::Item] {
        let start = self.pending.start;
        let data = unsafe { self.buf.data_ptr_mut().add(start) };
        unsafe { slice::from_raw_parts_mut(data, self.pending.len()) }
    }

    pub const fn len(&self) -> usize {
        self.pending.end - self.pending.start
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop draining. The items not yet yielded stay in the `Vec`.
    pub fn keep_rest(mut self) {
        let kept = self.pending.len();
        let skipped = self.pending.start - self.hole.start;
        if kept > 0 && skipped > 0 {
            unsafe {
                let dest = self.buf.data_ptr_mut().add(self.hole.start);
                slots::relocate(dest.add(skipped), dest, kept);
            }
        }
        self.hole.start += kept;
        self.pending = self.hole.start..self.hole.start;
    }

    #[inline]
    fn read_at(&self, index: usize) -> B::Item {
        unsafe { self.buf.data_ptr().add(index).read() }
    }
}

impl<B: VecBuffer> AsRef<[B::Item]> for Drain<'_, B> {
    fn as_ref(&self) -> &[B::Item] {
        self.as_slice()
    }
}

impl<B: VecBuffer> fmt::Debug for Drain<'_, B>
where
    B::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Drain").field(&self.as_slice()).finish()
    }
}

impl<B: VecBuffer> Iterator for Drain<'_, B> {
    type Item = B::Item;

    #[inline]
    fn next(&mut self) -> Option<B::Item> {
        let index = self.pending.next()?;
        Some(self.read_at(index))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<B: VecBuffer> DoubleEndedIterator for Drain<'_, B> {
    #[inline]
    fn next_back(&mut self) -> Option<B::Item> {
        let index = self.pending.next_back()?;
        Some(self.read_at(index))
    }
}

impl<B: VecBuffer> ExactSizeIterator for Drain<'_, B> {}

impl<B: VecBuffer> FusedIterator for Drain<'_, B> {}

impl<B: VecBuffer> Drop for Drain<'_, B> {
    fn drop(&mut self) {
        let rest = self.pending.clone();
        self.pending.start = rest.end;
        if !rest.is_empty() {
            unsafe { slots::drop_slots(self.buf.data_ptr_mut().add(rest.start), rest.len()) };
        }
        let gap = self.hole.len();
        if gap > 0 && self.tail > 0 {
            unsafe {
                let dest = self.buf.data_ptr_mut().add(self.hole.start);
                slots::relocate(dest.add(gap), dest, self.tail);
            }
        }
        let len = self.hole.start + self.tail;
        if len > 0 {
            unsafe { self.buf.set_length(B::Index::from_usize(len)) }
        }
    }
}
