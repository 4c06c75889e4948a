use crate::domain::BotEvent;

/// Fan-out of events to whoever is listening
///
/// Publishing never blocks and never fails; slow or gone listeners are the
/// implementation's problem.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, event: BotEvent);
}
