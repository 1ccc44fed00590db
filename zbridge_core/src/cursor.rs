/// A bounded, non-owning view `[start, end)` over a caller-owned byte region.
///
/// The cursor never owns memory. `data` may be absent (an unset cursor), and
/// nothing stops a caller from building a cursor whose bounds do not fit the
/// region; both cases are reported by [`acquire`](InputCursor::acquire)
/// returning `None` rather than panicking, so the bridge can turn them into a
/// buffer-access failure.
///
/// Callers advance `start` themselves after each bridge step, by the counts
/// reported in the step's [`Progress`](crate::Progress).
#[derive(Debug)]
pub struct BufferCursor<D> {
    pub data: Option<D>,
    /// Inclusive offset of the first byte available.
    pub start: usize,
    /// Exclusive offset one past the last byte available.
    pub end: usize,
}

/// Bytes available for the codec to consume. Never mutated by the bridge.
pub type InputCursor<'a> = BufferCursor<&'a [u8]>;

/// Scratch space the codec may fill. Only `[start, start + produced)` is
/// meaningful after a step.
pub type OutputCursor<'a> = BufferCursor<&'a mut [u8]>;

impl<D: AsRef<[u8]>> BufferCursor<D> {
    pub fn new(data: D, start: usize, end: usize) -> Self {
        Self {
            data: Some(data),
            start,
            end,
        }
    }

    /// A cursor spanning the whole region.
    pub fn full(data: D) -> Self {
        let end = <D as AsRef<[u8]>>::as_ref(&data).len();
        Self::new(data, 0, end)
    }

    /// A cursor with no region attached.
    pub fn unset() -> Self {
        Self {
            data: None,
            start: 0,
            end: 0,
        }
    }

    /// Size of the attached region, or 0 when unset.
    pub fn capacity(&self) -> usize {
        self.data
            .as_ref()
            .map_or(0, |d| <D as AsRef<[u8]>>::as_ref(d).len())
    }

    /// Bytes between `start` and `end`; 0 for an inverted cursor.
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// `0 <= start <= end <= capacity` and a region is attached.
    pub fn is_valid(&self) -> bool {
        self.data.is_some() && self.start <= self.end && self.end <= self.capacity()
    }

    /// Move `start` forward by `n`, never past `end`.
    pub fn advance(&mut self, n: usize) {
        self.start = self.start.saturating_add(n).min(self.end);
    }
}

impl<'a> InputCursor<'a> {
    /// Resolves the region for one bridge step.
    ///
    /// The window is `data[..end]` positioned at `start`. The borrow is shared,
    /// so releasing it can never write anything back.
    pub fn acquire(&self) -> Option<InWindow<'a>> {
        if !self.is_valid() {
            return None;
        }
        let data: &'a [u8] = self.data?;
        Some(InWindow {
            src: &data[..self.end],
            pos: self.start,
        })
    }
}

impl<'a> OutputCursor<'a> {
    /// Resolves the region for one bridge step.
    ///
    /// The window is `data[..end]` positioned at `start`. Writes land directly
    /// in the caller's region, so they are committed as soon as the window is
    /// dropped.
    pub fn acquire(&mut self) -> Option<OutWindow<'_>> {
        if !self.is_valid() {
            return None;
        }
        let end = self.end;
        let pos = self.start;
        let data = self.data.as_deref_mut()?;
        Some(OutWindow {
            dst: &mut data[..end],
            pos,
        })
    }

    /// The bytes written in `[start, start + produced)`.
    pub fn written(&self, produced: usize) -> &[u8] {
        match self.data.as_deref() {
            Some(data) => {
                let end = self.start.saturating_add(produced).min(data.len());
                &data[self.start.min(end)..end]
            }
            None => &[],
        }
    }
}

/// Codec-facing input descriptor: size is `src.len()`, the codec advances `pos`.
#[derive(Debug)]
pub struct InWindow<'a> {
    pub src: &'a [u8],
    pub pos: usize,
}

/// Codec-facing output descriptor: size is `dst.len()`, the codec advances `pos`.
#[derive(Debug)]
pub struct OutWindow<'a> {
    pub dst: &'a mut [u8],
    pub pos: usize,
}

impl InWindow<'_> {
    /// The unread tail `src[pos..]`.
    pub fn unread(&self) -> &[u8] {
        &self.src[self.pos.min(self.src.len())..]
    }
}

impl OutWindow<'_> {
    /// The unfilled tail `dst[pos..]`.
    pub fn unfilled(&mut self) -> &mut [u8] {
        let pos = self.pos.min(self.dst.len());
        &mut self.dst[pos..]
    }
}
