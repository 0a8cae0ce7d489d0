//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at one price. Orders are kept in
//! arrival order to enforce time priority. Storage is a slab threaded as a
//! doubly-linked list: handles stay valid while other orders come and go, so a
//! cancel in the middle of the queue is O(1) given the handle.

use slab::Slab;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

/// Stable handle to an order inside its price level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderHandle(usize);

/// Entry in the price level queue
#[derive(Debug, Clone)]
struct OrderNode {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

/// A price level containing orders at a specific price
///
/// Owns its orders. `total_quantity` is kept in lock-step with the sum of the
/// remaining quantities of the queued orders.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    orders: Slab<OrderNode>,
    head: Option<usize>,
    tail: Option<usize>,
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: Slab::new(),
            head: None,
            tail: None,
            total_quantity: Quantity::zero(),
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Whether `quantity` more lots fit in the level total
    pub fn can_absorb(&self, quantity: Quantity) -> bool {
        self.total_quantity.checked_add(quantity).is_some()
    }

    /// Append an order at the back of the queue (lowest time priority)
    ///
    /// Returns None, leaving the level untouched, if the level total would
    /// overflow.
    pub fn enqueue(&mut self, order: Order) -> Option<OrderHandle> {
        let total = self.total_quantity.checked_add(order.remaining_quantity)?;
        let key = self.orders.insert(OrderNode {
            order,
            prev: self.tail,
            next: None,
        });

        match self.tail.and_then(|tail| self.orders.get_mut(tail)) {
            Some(tail) => tail.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.total_quantity = total;

        Some(OrderHandle(key))
    }

    /// Peek at the front order without removing it
    pub fn peek_front(&self) -> Option<&Order> {
        self.head.and_then(|key| self.orders.get(key)).map(|node| &node.order)
    }

    /// Handle of the front order
    pub fn front_handle(&self) -> Option<OrderHandle> {
        self.head.map(OrderHandle)
    }

    /// Pop the front order from the queue
    pub fn pop_front(&mut self) -> Option<Order> {
        let key = self.head?;
        self.unlink(key)
    }

    pub fn get(&self, handle: OrderHandle) -> Option<&Order> {
        self.orders.get(handle.0).map(|node| &node.order)
    }

    /// Decrease one order's remaining quantity by `amount`
    ///
    /// Returns the order's new remaining quantity, or None (level untouched) if
    /// the handle is stale or `amount` exceeds what the order has left.
    pub fn reduce(&mut self, handle: OrderHandle, amount: Quantity) -> Option<Quantity> {
        let node = self.orders.get_mut(handle.0)?;
        let remaining = node.order.fill(amount)?;
        self.total_quantity = self.total_quantity.saturating_sub(amount);
        Some(remaining)
    }

    /// Remove an order from anywhere in the queue
    ///
    /// Relative order of the remaining entries is preserved.
    pub fn remove(&mut self, handle: OrderHandle) -> Option<Order> {
        self.unlink(handle.0)
    }

    fn unlink(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.try_remove(key)?;

        match node.prev.and_then(|prev| self.orders.get_mut(prev)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.orders.get_mut(next)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        self.total_quantity = self.total_quantity.saturating_sub(node.order.remaining_quantity);
        Some(node.order)
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Iterate orders front to back
    pub fn iter(&self) -> LevelIter<'_> {
        LevelIter {
            orders: &self.orders,
            cursor: self.head,
        }
    }

    /// Order ids front to back
    pub fn order_ids(&self) -> Vec<OrderId> {
        self.iter().map(|order| order.order_id).collect()
    }

    /// Recompute the aggregate from the queue and compare with the cached total
    ///
    /// Also checks that the linked list reaches every stored order.
    pub fn check_invariant(&self) -> bool {
        let mut linked = 0usize;
        let mut sum = Quantity::zero();
        for order in self.iter() {
            linked += 1;
            sum = match sum.checked_add(order.remaining_quantity) {
                Some(sum) => sum,
                None => return false,
            };
            if order.price != self.price || order.remaining_quantity.is_zero() {
                return false;
            }
        }
        linked == self.orders.len() && sum == self.total_quantity
    }
}

/// Front-to-back iterator over a level's orders
pub struct LevelIter<'a> {
    orders: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.orders.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.order)
    }
}
