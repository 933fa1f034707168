use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;
use core::slice;

use crate::capacity::Index;
use crate::storage::slots;

use super::buffer::VecBuffer;

/// An owning iterator over the items of a `Vec`, returned by `into_iter`.
///
/// The buffer is released once the iterator is dropped, along with any
/// items it did not yield.
pub struct IntoIter<B: VecBuffer> {
    pending: Range<usize>,
    buf: B,
}

impl<B: VecBuffer> IntoIter<B> {
    pub(super) fn new(mut buf: B) -> Self {
        let len = buf.length().to_usize();
        if len > 0 {
            // the iterator owns the items from here on
            unsafe { buf.set_length(B::Index::ZERO) };
        }
        Self {
            pending: 0..len,
            buf,
        }
    }

    #[inline]
    fn pending_ptr(&self) -> *const B::Item {
        unsafe { self.buf.data_ptr().add(self.pending.start) }
    }

    /// The items not yet yielded.
    pub fn as_slice(&self) -> &[B::Item] {
        unsafe { slice::from_raw_parts(self.pending_ptr(), self.pending.len()) }
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

    #[inline]
    fn read_at(&self, index: usize) -> B::Item {
        unsafe { self.buf.data_ptr().add(index).read() }
    }
}

impl<B: VecBuffer> AsRef<[B::Item]> for IntoIter<B> {
    fn as_ref(&self) -> &[B::Item] {
        self.as_slice()
    }
}

impl<B: VecBuffer> AsMut<[B::Item]> for IntoIter<B> {
    fn as_mut(&mut self) -> &mut [B::Item] {
        self.as_mut_slice()
    }
}

impl<B: VecBuffer> fmt::Debug for IntoIter<B>
where
    B::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<B: VecBuffer> Iterator for IntoIter<B> {
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

impl<B: VecBuffer> DoubleEndedIterator for IntoIter<B> {
    #[inline]
    fn next_back(&mut self) -> Option<B::Item> {
        let index = self.pending.next_back()?;
        Some(self.read_at(index))
    }
}

impl<B: VecBuffer> ExactSizeIterator for IntoIter<B> {}

impl<B: VecBuffer> FusedIterator for IntoIter<B> {}

impl<B: VecBuffer> Drop for IntoIter<B> {
    fn drop(&mut self) {
        let rest = self.pending.clone();
        self.pending.start = rest.end;
        if !rest.is_empty() {
            unsafe { slots::drop_slots(self.buf.data_ptr_mut().add(rest.start), rest.len()) };
        }
    }
}
