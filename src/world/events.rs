use std::collections::{HashMap, HashSet};

use crate::collision::contact::{ContactManifold, ContactPair, ContactPhase};

/// Receives contact and trigger transitions for the body it is registered against.
pub trait EventReceiver: Send + Sync {
    /// Solid contact transition. Exit carries the last manifold seen for the pair.
    fn on_contact(&mut self, _phase: ContactPhase, _pair: &ContactPair, _manifold: &ContactManifold) {}

    /// Sensor overlap transition.
    fn on_trigger(&mut self, _phase: ContactPhase, _pair: &ContactPair) {}
}

/// One transition produced by a resolution pass.
#[derive(Debug, Clone)]
pub enum ContactEvent {
    Contact {
        phase: ContactPhase,
        pair: ContactPair,
        manifold: ContactManifold,
    },
    Trigger {
        phase: ContactPhase,
        pair: ContactPair,
    },
}

impl ContactEvent {
    pub fn pair(&self) -> &ContactPair {
        match self {
            ContactEvent::Contact { pair, .. } | ContactEvent::Trigger { pair, .. } => pair,
        }
    }

    pub fn phase(&self) -> ContactPhase {
        match self {
            ContactEvent::Contact { phase, .. } | ContactEvent::Trigger { phase, .. } => *phase,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, ContactEvent::Trigger { .. })
    }

    pub(crate) fn deliver(&self, receiver: &mut dyn EventReceiver) {
        match self {
            ContactEvent::Contact {
                phase,
                pair,
                manifold,
            } => receiver.on_contact(*phase, pair, manifold),
            ContactEvent::Trigger { phase, pair } => receiver.on_trigger(*phase, pair),
        }
    }
}

/// Remembers the previous pass's pairs to classify Enter/Stay/Exit.
#[derive(Debug, Default)]
pub struct ContactTracker {
    contacts: HashMap<ContactPair, ContactManifold>,
    triggers: HashSet<ContactPair>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tracked sets with this pass's pairs. Enter/Stay events follow the
    /// order of the input; Exit events follow, ordered by pair.
    pub fn advance(
        &mut self,
        contacts: Vec<(ContactPair, ContactManifold)>,
        triggers: Vec<ContactPair>,
    ) -> Vec<ContactEvent> {
        let mut events = Vec::with_capacity(contacts.len() + triggers.len());

        let mut current = HashMap::with_capacity(contacts.len());
        for (pair, manifold) in contacts {
            if current.contains_key(&pair) {
                continue;
            }
            let phase = match self.contacts.remove(&pair) {
                Some(_) => ContactPhase::Stay,
                None => ContactPhase::Enter,
            };
            events.push(ContactEvent::Contact {
                phase,
                pair: pair.clone(),
                manifold,
            });
            current.insert(pair, manifold);
        }
        let mut ended: Vec<_> = std::mem::replace(&mut self.contacts, current)
            .into_iter()
            .collect();
        ended.sort_by_key(|(pair, _)| (pair.first(), pair.second()));
        events.extend(ended.into_iter().map(|(pair, manifold)| ContactEvent::Contact {
            phase: ContactPhase::Exit,
            pair,
            manifold,
        }));

        let mut current = HashSet::with_capacity(triggers.len());
        for pair in triggers {
            if current.contains(&pair) {
                continue;
            }
            let phase = if self.triggers.remove(&pair) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            events.push(ContactEvent::Trigger {
                phase,
                pair: pair.clone(),
            });
            current.insert(pair);
        }
        let mut ended: Vec<_> = std::mem::replace(&mut self.triggers, current)
            .into_iter()
            .collect();
        ended.sort_by_key(|pair| (pair.first(), pair.second()));
        events.extend(ended.into_iter().map(|pair| ContactEvent::Trigger {
            phase: ContactPhase::Exit,
            pair,
        }));

        events
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    pub fn active_triggers(&self) -> usize {
        self.triggers.len()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.triggers.clear();
    }
}
