use std::collections::VecDeque;

/// Handle for one requested idle slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdleTicket(pub u64);

/// Something that can run work "later, when idle", the way a browser's
/// `requestIdleCallback` does. The host calls back into the owner with the
/// ticket when the slot arrives.
pub trait IdleHost {
    fn request_idle(&mut self) -> IdleTicket;

    /// Withdraw a pending request. Unknown or spent tickets are ignored.
    fn cancel_idle(&mut self, ticket: IdleTicket);
}

/// FIFO idle host for headless drivers and tests: pending tickets are
/// handed out by [`IdleQueue::pop`].
#[derive(Debug, Default)]
pub struct IdleQueue {
    next: u64,
    pending: VecDeque<IdleTicket>,
}

impl IdleQueue {
    pub fn new() -> Self { Self::default() }

    /// The oldest pending ticket, removing it from the queue.
    pub fn pop(&mut self) -> Option<IdleTicket> { self.pending.pop_front() }

    #[inline] pub fn len(&self) -> usize { self.pending.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}

impl IdleHost for IdleQueue {
    fn request_idle(&mut self) -> IdleTicket {
        self.next += 1;
        let ticket = IdleTicket(self.next);
        self.pending.push_back(ticket);
        ticket
    }

    fn cancel_idle(&mut self, ticket: IdleTicket) {
        self.pending.retain(|&t| t != ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_fifo_and_unique() {
        let mut queue = IdleQueue::new();
        let a = queue.request_idle();
        let b = queue.request_idle();
        assert_ne!(a, b);
        assert_eq!(queue.pop(), Some(a));
        assert_eq!(queue.pop(), Some(b));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn cancelled_tickets_never_fire() {
        let mut queue = IdleQueue::new();
        let a = queue.request_idle();
        let b = queue.request_idle();
        queue.cancel_idle(a);
        queue.cancel_idle(IdleTicket(999));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(b));
    }
}
