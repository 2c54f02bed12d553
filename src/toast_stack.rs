/// Bounded FIFO of visible toasts
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

/// Holds at most `capacity` toast handles, oldest first.
///
/// `push` evicts the oldest handle once the stack is full; `expire` removes a
/// handle whose display timeout elapsed. The caller owns what happens to the
/// returned handles (fade-out, removal from the page).
#[derive(Debug)]
pub struct ToastStack<T> {
    entries: VecDeque<(ToastId, T)>,
    capacity: usize,
    next_id: u64,
}

impl<T> ToastStack<T> {
    pub fn new(capacity: usize) -> Self {
        ToastStack {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    /// Add a toast, returning its id and the evicted handle, if any
    pub fn push(&mut self, toast: T) -> (ToastId, Option<T>) {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front().map(|(_, old)| old)
        } else {
            None
        };

        let id = ToastId(self.next_id);
        self.next_id += 1;
        self.entries.push_back((id, toast));

        (id, evicted)
    }

    /// Remove the toast with `id`; `None` if it was already evicted
    pub fn expire(&mut self, id: ToastId) -> Option<T> {
        let position = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        self.entries.remove(position).map(|(_, toast)| toast)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, toast)| toast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut stack = ToastStack::new(3);

        assert_eq!(stack.push("a").1, None);
        assert_eq!(stack.push("b").1, None);
        assert_eq!(stack.push("c").1, None);

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fourth_push_evicts_oldest() {
        let mut stack = ToastStack::new(3);
        stack.push("a");
        stack.push("b");
        stack.push("c");

        let (_, evicted) = stack.push("d");

        assert_eq!(evicted, Some("a"));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut stack = ToastStack::new(3);
        for i in 0..20 {
            stack.push(i);
            assert!(stack.len() <= 3);
        }
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![17, 18, 19]);
    }

    #[test]
    fn test_expire() {
        let mut stack = ToastStack::new(3);
        let (a, _) = stack.push("a");
        let (b, _) = stack.push("b");

        assert_eq!(stack.expire(a), Some("a"));
        assert_eq!(stack.expire(a), None);
        assert_eq!(stack.len(), 1);

        // Expired toasts free their slot, so nothing is evicted here
        stack.push("c");
        assert_eq!(stack.push("d").1, None);
        assert_eq!(stack.expire(b), Some("b"));
    }

    #[test]
    fn test_expire_after_eviction() {
        let mut stack = ToastStack::new(1);
        let (first, _) = stack.push("first");
        let (_, evicted) = stack.push("second");

        assert_eq!(evicted, Some("first"));
        assert_eq!(stack.expire(first), None);
        assert!(!stack.is_empty());
    }
}
