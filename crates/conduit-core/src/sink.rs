//! Downstream sinks (ship engines) activated by fully heated nodes

/// External activation target attached to a terminal node
#[derive(Clone, Debug)]
pub struct Sink {
    pub name: String,
    pub(crate) activated: bool,
}

impl Sink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activated: false,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }
}
