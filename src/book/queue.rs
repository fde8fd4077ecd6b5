use std::{collections::HashMap, hash::Hash};

use slab::Slab;

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<usize>,
    prev: Option<usize>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V) -> Node<K, V> {
        Node {
            key,
            value,
            next: None,
            prev: None,
        }
    }
}

/// FIFO queue backed by a slab-allocated doubly linked list with a key index,
/// so removal and replacement by key are O(1) and keep everyone else's slot.
pub struct Queue<K, V> {
    keys: HashMap<K, usize>,
    backing: Slab<Node<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K: Eq + Hash + Clone, V> Queue<K, V> {
    pub fn new() -> Queue<K, V> {
        Queue {
            keys: HashMap::new(),
            backing: Slab::new(),
            head: None,
            tail: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.backing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.backing.len()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let id = *self.keys.get(key)?;
        self.backing.get(id).map(|node| &node.value)
    }

    /// Swaps the value stored under `key` without moving it in the queue.
    /// Returns the previous value, or `None` if the key is absent.
    pub fn replace(&mut self, key: &K, value: V) -> Option<V> {
        let id = *self.keys.get(key)?;
        let node = self.backing.get_mut(id)?;
        Some(std::mem::replace(&mut node.value, value))
    }

    pub fn remove_key(&mut self, key: &K) -> Option<V> {
        let id = self.keys.remove(key)?;
        let node = self.backing.try_remove(id)?;

        match node.next {
            Some(nid) => self.backing[nid].prev = node.prev,
            None => self.tail = node.prev,
        }

        match node.prev {
            Some(pid) => self.backing[pid].next = node.next,
            None => self.head = node.next,
        }

        Some(node.value)
    }

    /// Appends to the tail. A key already queued is left untouched and `false` returned.
    pub fn push_back(&mut self, key: K, value: V) -> bool {
        if self.keys.contains_key(&key) {
            return false;
        }

        let mut new_node = Node::new(key.clone(), value);
        new_node.prev = self.tail;
        let id = self.backing.insert(new_node);
        self.keys.insert(key, id);

        match self.tail {
            Some(pid) => self.backing[pid].next = Some(id),
            None => self.head = Some(id),
        };
        self.tail = Some(id);

        true
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            current: self.head,
        }
    }
}

pub struct Iter<'a, K, V> {
    list: &'a Queue<K, V>,
    current: Option<usize>,
}

impl<'a, K: Eq + Hash + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = &self.list.backing[id];
        self.current = node.next;
        Some((&node.key, &node.value))
    }
}

impl<K: Eq + Hash + Clone, V> Default for Queue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
