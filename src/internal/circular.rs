//! Cycle detection for a single resolution call.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::error::{DiError, DiResult};
use crate::key::{ContractId, DependencyKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    contract: ContractId,
    key: DependencyKey,
}

/// The `(contract, key)` pairs currently being resolved, outermost first.
///
/// Owned by one resolution call, so it is never shared between threads.
pub(crate) struct ResolutionStack {
    frames: RefCell<SmallVec<[Frame; 16]>>,
    max_depth: usize,
}

impl ResolutionStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            frames: RefCell::new(SmallVec::new()),
            max_depth,
        }
    }

    /// Pushes a frame, failing fast if it is already on the stack.
    pub(crate) fn enter(&self, contract: ContractId, key: DependencyKey) -> DiResult<FrameGuard<'_>> {
        let frame = Frame { contract, key };
        let mut frames = self.frames.borrow_mut();

        if frames.contains(&frame) {
            let path = frames
                .iter()
                .chain(std::iter::once(&frame))
                .map(|f| format!("{}[{}]", f.contract.name(), f.key))
                .collect();
            return Err(DiError::CyclicDependency(path));
        }

        if frames.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.max_depth));
        }

        frames.push(frame);
        Ok(FrameGuard { stack: self })
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

/// Pops its frame when dropped, including on error paths.
pub(crate) struct FrameGuard<'a> {
    stack: &'a ResolutionStack,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.borrow_mut().pop();
    }
}
