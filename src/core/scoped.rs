//! Thread-local scoped attribute frames
//!
//! Each thread owns a chain of frames, innermost at the head. Pushing a
//! frame returns a [`ScopeGuard`]; dropping the guard restores its parent.
//! Guards hold an `Rc` to their frame, so they cannot move across threads
//! and the chain head never needs rebinding when the logger moves.

use super::attribute::AttributeList;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct Frame {
    attributes: AttributeList<'static>,
    parent: Option<Rc<Frame>>,
}

impl Frame {
    pub(crate) fn attributes(&self) -> &AttributeList<'static> {
        &self.attributes
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Rc<Frame>>> = const { RefCell::new(None) };
}

/// RAII guard for a scoped attribute frame.
///
/// Records captured while the guard is live see its attributes before any
/// outer frame's. Guards must be dropped in LIFO order on the thread that
/// created them; an out-of-order drop is a programming error and aborts the
/// process.
pub struct ScopeGuard {
    frame: Rc<Frame>,
}

/// Push a frame onto the current thread's chain.
pub(crate) fn push(attributes: AttributeList<'static>) -> ScopeGuard {
    CURRENT.with(|cell| {
        let parent = cell.borrow().clone();
        let frame = Rc::new(Frame { attributes, parent });
        *cell.borrow_mut() = Some(Rc::clone(&frame));
        ScopeGuard { frame }
    })
}

/// The current thread's live frames, innermost first.
pub(crate) fn snapshot() -> Vec<Rc<Frame>> {
    CURRENT.with(|cell| {
        let mut frames = Vec::new();
        let mut cursor = cell.borrow().clone();
        while let Some(frame) = cursor {
            cursor = frame.parent.clone();
            frames.push(frame);
        }
        frames
    })
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let restored = CURRENT.with(|cell| {
            let mut current = cell.borrow_mut();
            match current.as_ref() {
                Some(head) if Rc::ptr_eq(head, &self.frame) => {
                    *current = self.frame.parent.clone();
                    true
                }
                _ => false,
            }
        });

        if !restored {
            eprintln!("[LOGGER ERROR] scope guard dropped out of LIFO order; aborting");
            std::process::abort();
        }
    }
}
