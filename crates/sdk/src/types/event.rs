use alloy::primitives::TxHash;

/// Event together with the position of the log it was decoded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext<E> {
    tx_hash: TxHash,
    tx_index: u64,
    log_index: u64,
    event: E,
}

impl<E> EventContext<E> {
    pub fn new(tx_hash: TxHash, tx_index: u64, log_index: u64, event: E) -> Self {
        Self { tx_hash, tx_index, log_index, event }
    }

    /// Hash of the transaction emitted the event.
    pub fn tx_hash(&self) -> TxHash { self.tx_hash }

    /// Index of the transaction within the block.
    pub fn tx_index(&self) -> u64 { self.tx_index }

    /// Index of the log within the block.
    pub fn log_index(&self) -> u64 { self.log_index }

    pub fn event(&self) -> &E { &self.event }

    pub fn into_event(self) -> E { self.event }

    /// Derives an event with the same context.
    pub fn pass<T>(&self, event: T) -> EventContext<T> {
        EventContext {
            tx_hash: self.tx_hash,
            tx_index: self.tx_index,
            log_index: self.log_index,
            event,
        }
    }
}

/// Events of a single block, in log order.
#[derive(Clone, Debug)]
pub struct BlockEvents<E> {
    instant: super::BlockInstant,
    events: Vec<E>,
}

impl<E> BlockEvents<E> {
    pub fn new(instant: super::BlockInstant, events: Vec<E>) -> Self { Self { instant, events } }

    pub fn instant(&self) -> super::BlockInstant { self.instant }

    pub fn events(&self) -> &[E] { &self.events }

    pub fn is_empty(&self) -> bool { self.events.is_empty() }
}
