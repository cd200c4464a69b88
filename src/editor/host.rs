use crate::grid::{IdleHost, IdleQueue, IdleTicket};

/// The parts of the map widget the editor drives directly.
pub trait MapHost {
    /// Enable or disable the map's own pan-on-drag gesture.
    fn set_dragging(&mut self, enabled: bool);

    /// Start delivering map-level pointer down/up/leave events (and the
    /// window-level pointer-up fallback) to the editor.
    fn attach_paint_listeners(&mut self);

    /// Undo [`attach_paint_listeners`](MapHost::attach_paint_listeners).
    fn detach_paint_listeners(&mut self);
}

/// A map host with no screen: records what the editor asked of it and
/// queues idle slots for an explicit driver loop.
#[derive(Debug)]
pub struct HeadlessMap {
    dragging: bool,
    listeners: usize,
    idle: IdleQueue,
}

impl Default for HeadlessMap {
    fn default() -> Self { Self { dragging: true, listeners: 0, idle: IdleQueue::new() } }
}

impl HeadlessMap {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn dragging(&self) -> bool { self.dragging }

    /// Number of attached listener sets; more than one indicates a leak.
    #[inline] pub fn listeners(&self) -> usize { self.listeners }

    /// Next idle slot to deliver, oldest first.
    pub fn take_idle(&mut self) -> Option<IdleTicket> { self.idle.pop() }

    #[inline] pub fn pending_idle(&self) -> usize { self.idle.len() }
}

impl MapHost for HeadlessMap {
    fn set_dragging(&mut self, enabled: bool) { self.dragging = enabled }

    fn attach_paint_listeners(&mut self) { self.listeners += 1 }

    fn detach_paint_listeners(&mut self) { self.listeners = self.listeners.saturating_sub(1) }
}

impl IdleHost for HeadlessMap {
    fn request_idle(&mut self) -> IdleTicket { self.idle.request_idle() }

    fn cancel_idle(&mut self, ticket: IdleTicket) { self.idle.cancel_idle(ticket) }
}
