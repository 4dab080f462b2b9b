use crate::frame::Frame;

/// Registration handle for a post-render listener.
///
/// Ids are never reused within a hub, so a stale handle can't unsubscribe a
/// newer listener.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Registry of listeners notified after every rendered frame.
///
/// Ordering contract:
/// - Listeners are notified in subscription order.
/// - Unsubscribing does not perturb the order of the remaining listeners.
///
/// The payload `T` is the listener's own state (for overlays, the anchor it
/// tracks), so a listener is one stable registration whose state is updated
/// in place instead of being re-registered on every change.
#[derive(Debug)]
pub struct PostRenderHub<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, T)>,
}

impl<T> Default for PostRenderHub<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> PostRenderHub<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, payload: T) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, payload));
        id
    }

    /// Releases a registration, returning its payload if it was still live.
    pub fn unsubscribe(&mut self, id: ListenerId) -> Option<T> {
        let idx = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(idx).1)
    }

    /// Releases every registration (scene teardown). Returns how many were live.
    pub fn clear(&mut self) -> usize {
        let n = self.listeners.len();
        self.listeners.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn get(&self, id: ListenerId) -> Option<&T> {
        self.listeners
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, id: ListenerId) -> Option<&mut T> {
        self.listeners
            .iter_mut()
            .find(|(lid, _)| *lid == id)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ListenerId, &T)> + '_ {
        self.listeners.iter().map(|(id, p)| (*id, p))
    }

    /// Runs `f` for every live listener, in subscription order.
    pub fn notify<F>(&mut self, frame: Frame, mut f: F)
    where
        F: FnMut(Frame, ListenerId, &mut T),
    {
        for (id, payload) in &mut self.listeners {
            f(frame, *id, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListenerId, PostRenderHub};
    use crate::frame::Frame;

    #[test]
    fn notifies_in_subscription_order() {
        let mut hub = PostRenderHub::new();
        hub.subscribe("b");
        hub.subscribe("a");
        hub.subscribe("c");

        let mut seen = Vec::new();
        hub.notify(Frame::new(0, 1.0), |_, _, p| seen.push(*p));
        assert_eq!(seen, vec!["b", "a", "c"]);
    }

    #[test]
    fn unsubscribe_keeps_remaining_order() {
        let mut hub = PostRenderHub::new();
        let a = hub.subscribe("a");
        hub.subscribe("b");
        hub.subscribe("c");

        assert_eq!(hub.unsubscribe(a), Some("a"));
        assert_eq!(hub.unsubscribe(a), None);

        let order: Vec<_> = hub.iter().map(|(_, p)| *p).collect();
        assert_eq!(order, vec!["b", "c"]);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut hub = PostRenderHub::new();
        let a = hub.subscribe(1);
        hub.unsubscribe(a);
        let b = hub.subscribe(2);
        assert_ne!(a, b);
        assert_eq!(b, ListenerId(1));
        assert!(hub.get(a).is_none());
        assert_eq!(hub.get(b), Some(&2));
    }

    #[test]
    fn clear_releases_everything() {
        let mut hub = PostRenderHub::new();
        hub.subscribe(1);
        hub.subscribe(2);
        assert_eq!(hub.clear(), 2);
        assert!(hub.is_empty());

        let mut calls = 0;
        hub.notify(Frame::new(1, 1.0), |_, _, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn payload_is_mutable_in_place() {
        let mut hub = PostRenderHub::new();
        let id = hub.subscribe(0u32);
        hub.notify(Frame::new(0, 1.0), |f, _, n| *n += f.index as u32 + 1);
        if let Some(n) = hub.get_mut(id) {
            *n += 10;
        }
        assert_eq!(hub.get(id), Some(&11));
    }
}
