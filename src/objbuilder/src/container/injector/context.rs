use crate::key::Key;

/// Information carried along one resolution request.
#[derive(Clone)]
pub struct CallContext<'a> {
    trace: InjectionTrace<'a>,
}

impl<'a> CallContext<'a> {
    pub fn new(key: &'a Key) -> Self {
        Self {
            trace: InjectionTrace::new(key),
        }
    }

    pub fn append<'b>(&'b self, key: &'b Key) -> CallContext<'b> {
        CallContext {
            trace: self.trace.append(key),
        }
    }

    pub fn key(&self) -> &Key {
        self.trace.key()
    }

    pub fn trace(&self) -> &InjectionTrace<'_> {
        &self.trace
    }
}

/// The chain of keys from the outermost request down to the current one.
#[derive(Clone)]
pub struct InjectionTrace<'a> {
    key: &'a Key,
    previous: Option<&'a InjectionTrace<'a>>,
}

impl<'a> InjectionTrace<'a> {
    pub fn new(key: &'a Key) -> Self {
        Self {
            key,
            previous: None,
        }
    }

    pub fn append<'b>(&'b self, key: &'b Key) -> InjectionTrace<'b> {
        InjectionTrace {
            key,
            previous: Some(self),
        }
    }

    pub fn key(&self) -> &Key {
        self.key
    }

    pub fn previous(&self) -> Option<&InjectionTrace<'a>> {
        self.previous
    }

    /// Returns true if `key` is requested by some outer level of the trace.
    pub fn previous_exist_key(&self, key: &Key) -> bool {
        let mut this = self;
        while let Some(previous) = this.previous() {
            if previous.key() == key {
                return true;
            }
            this = previous;
        }
        false
    }
}
