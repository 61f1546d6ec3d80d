//! Slot arena holding a doubly linked list.
//!
//! Nodes live in a `Vec` and link to each other by slot index. Callers keep
//! [`NodeHandle`]s, which pair the slot with the generation it was allocated
//! in, so a handle to a removed node never resolves to whatever reused the
//! slot afterwards.

/// Stable reference to a node in a [`LinkedArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    slot: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    node: Option<Node<T>>,
}

/// Insertion-ordered list with O(1) push, pop and removal by handle
#[derive(Debug)]
pub struct LinkedArena<T> {
    slots: Vec<Slot<T>>,
    /// Vacant slot indices, reused before the arena grows
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for LinkedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots, live or vacant.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn push_back(&mut self, value: T) -> NodeHandle {
        let node = Node {
            value,
            prev: self.tail,
            next: None,
        };

        let slot = match self.free_list.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.generation += 1;
                entry.node = Some(node);
                slot
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            },
        };

        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = self.slots[tail].node.as_mut() {
                    tail_node.next = Some(slot);
                }
            },
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;

        NodeHandle {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let slot = self.slots.get(handle.slot)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.node.as_ref().map(|node| &node.value)
    }

    /// Unlink and return the node's value. Stale handles return `None`.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot)?;
        if slot.generation != handle.generation {
            return None;
        }
        let node = slot.node.take()?;

        match node.prev {
            Some(prev) => {
                if let Some(prev_node) = self.slots[prev].node.as_mut() {
                    prev_node.next = node.next;
                }
            },
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => {
                if let Some(next_node) = self.slots[next].node.as_mut() {
                    next_node.prev = node.prev;
                }
            },
            None => self.tail = node.prev,
        }

        self.free_list.push(handle.slot);
        self.len -= 1;
        Some(node.value)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: self,
            cursor: self.head,
            remaining: self.len,
        }
    }
}

/// Front-to-back iterator over a [`LinkedArena`]
pub struct Iter<'a, T> {
    arena: &'a LinkedArena<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.slots.get(self.cursor?)?.node.as_ref()?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
