// Step event bus
//
// Observers subscribe to step ticks and get back an opaque token; only
// that token can remove the subscription, so one observer can never
// detach another's callback.

/// Capability token returned by [`StepBus::subscribe`].
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription(u64);

type StepCallback = Box<dyn FnMut(usize)>;

/// Fan-out of step indices to registered observers, in subscription order.
#[derive(Default)]
pub struct StepBus {
    subscribers: Vec<(u64, StepCallback)>,
    next_id: u64,
}

impl StepBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(usize) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        Subscription(id)
    }

    /// Removes the subscription the token was issued for. Consumes the
    /// token, so a subscription cannot be removed twice.
    pub fn unsubscribe(&mut self, token: Subscription) {
        self.subscribers.retain(|(id, _)| *id != token.0);
    }

    pub fn publish(&mut self, step: usize) {
        for (_, callback) in &mut self.subscribers {
            callback(step);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
