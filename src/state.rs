use framescroll_core::{PlaybackSnapshot, PlayerConfig};
use leptos::prelude::*;

/// Reactive state shared through context.
#[derive(Clone, Copy)]
pub struct AppState {
    pub config: StoredValue<PlayerConfig>,
    /// Mirror of the player's latest published snapshot.
    pub snapshot: RwSignal<PlaybackSnapshot>,
}

impl AppState {
    pub fn new(config: PlayerConfig) -> Self {
        let caption = config.caption_list.first().cloned();
        Self {
            config: StoredValue::new(config),
            snapshot: RwSignal::new(PlaybackSnapshot {
                caption,
                ..PlaybackSnapshot::default()
            }),
        }
    }
}
