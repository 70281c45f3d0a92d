//! Re-entry detection for composite values.
//!
//! The guard keeps the identities of the composites that are *currently open*
//! on the traversal path in a side table owned by one top-level parse. Nothing
//! is written to the inspected values. A composite reached twice through
//! different, non-cyclic paths is traversed twice; only a back-edge to a
//! still-open ancestor is refused.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::value::Identity;

/// The composite is already open further up the current traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("composite {0:?} is already being traversed")]
pub struct AlreadyEntered(pub Identity);

/// Side table of open composites for one traversal.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    open: Rc<RefCell<HashSet<Identity>>>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `identity` open. The returned token closes it again when it is
    /// exited or dropped, so early returns and unwinding release it too.
    pub fn enter(&self, identity: Identity) -> Result<GuardToken, AlreadyEntered> {
        if !self.open.borrow_mut().insert(identity) {
            return Err(AlreadyEntered(identity));
        }
        Ok(GuardToken {
            open: Rc::clone(&self.open),
            identity,
        })
    }

    pub fn is_open(&self, identity: Identity) -> bool {
        self.open.borrow().contains(&identity)
    }

    pub fn open_count(&self) -> usize {
        self.open.borrow().len()
    }
}

/// Proof that a composite is open; releases it exactly once.
#[derive(Debug)]
#[must_use = "dropping the token closes the composite immediately"]
pub struct GuardToken {
    open: Rc<RefCell<HashSet<Identity>>>,
    identity: Identity,
}

impl GuardToken {
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Closes the composite. Consuming the token makes a second exit
    /// impossible.
    pub fn exit(self) {
        drop(self);
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.open.borrow_mut().remove(&self.identity);
    }
}
