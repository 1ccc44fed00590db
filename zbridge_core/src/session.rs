use std::fmt;

use crate::bridge::Progress;

/// Generation-checked index into a [`SessionTable`].
///
/// A handle stays unique for the table's lifetime: closing a session bumps its
/// slot's generation, so the old handle can never reach whatever reuses the
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    index: u32,
    generation: u32,
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A live session and the progress record of its most recent step.
#[derive(Debug)]
pub struct Entry<S> {
    pub session: S,
    pub progress: Progress,
}

#[derive(Debug)]
struct Slot<S> {
    generation: u32,
    entry: Option<Entry<S>>,
}

/// Arena of open sessions addressed by [`SessionHandle`].
#[derive(Debug)]
pub struct SessionTable<S> {
    slots: Vec<Slot<S>>,
    free: Vec<u32>,
}

impl<S> Default for SessionTable<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<S> SessionTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `session` and return its handle.
    pub fn insert(&mut self, session: S) -> SessionHandle {
        let entry = Entry {
            session,
            progress: Progress::default(),
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                SessionHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                SessionHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, handle: SessionHandle) -> Option<&Entry<S>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, handle: SessionHandle) -> Option<&mut Entry<S>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Close the session behind `handle`, handing it back so the caller can
    /// drop it. Returns `None` for a stale handle, so closing twice is harmless.
    pub fn remove(&mut self, handle: SessionHandle) -> Option<S> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(entry.session)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
