//! Emitter registry.
//!
//! Insertion order is preserved so emitters are updated in the order they were
//! registered. Removal happens in a separate sweep after the update pass.

use crate::emitter::{Emitter, EmitterId};
use crate::playback::Sound;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct EmitterRegistry {
    emitters: Vec<Emitter>,
}

impl EmitterRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, emitter: Emitter) {
        log::debug!("Registered emitter {}", emitter.id());
        self.emitters.push(emitter);
    }

    pub(crate) fn len(&self) -> usize {
        self.emitters.len()
    }

    pub(crate) fn contains(&self, id: EmitterId) -> bool {
        self.emitters.iter().any(|emitter| emitter.id() == id)
    }

    pub(crate) fn get(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.iter().find(|emitter| emitter.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.iter_mut().find(|emitter| emitter.id() == id)
    }

    pub(crate) fn ids(&self) -> Vec<EmitterId> {
        self.emitters.iter().map(Emitter::id).collect()
    }

    /// Whether `sound` already backs a registered emitter.
    pub(crate) fn tracks_sound(&self, sound: &Arc<dyn Sound>) -> bool {
        self.emitters
            .iter()
            .any(|emitter| Arc::ptr_eq(emitter.sound().handle(), sound))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Emitter> {
        self.emitters.iter_mut()
    }

    /// Removes every emitter `should_remove` agrees to, handing each one to
    /// `on_remove` before it is dropped. Returns how many were removed.
    pub(crate) fn sweep<F>(&mut self, mut on_remove: F) -> usize
    where
        F: FnMut(&mut Emitter),
    {
        let before = self.emitters.len();
        self.emitters.retain_mut(|emitter| {
            if emitter.should_remove() {
                on_remove(emitter);
                false
            } else {
                true
            }
        });
        before - self.emitters.len()
    }
}
