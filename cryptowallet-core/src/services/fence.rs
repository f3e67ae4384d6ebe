//! Generation counter used to discard superseded responses

/// Identifies one load issued through a [`RequestFence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Hands out increasing tickets; only the latest one is current.
///
/// In-flight calls are never cancelled. A response is applied only if the
/// ticket it was issued with is still current when it arrives.
#[derive(Debug, Default)]
pub struct RequestFence {
    generation: u64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every earlier ticket
    pub fn issue(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}
