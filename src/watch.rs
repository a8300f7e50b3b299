/// An explicitly owned observable value. The host wires one up for the
/// "active terminal" and the connection layer subscribes to it; there is
/// no process-wide instance.
pub struct Watched<T> {
    value: T,
    listeners: Vec<Box<dyn FnMut(&T) + Send>>,
}

impl<T: PartialEq> Watched<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value; listeners fire only when it actually changed.
    pub fn set(&mut self, value: T) {
        if self.value == value {
            return;
        }
        self.value = value;
        for listener in &mut self.listeners {
            listener(&self.value);
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }
}
