use framescroll_core::PlayerConfig;

/// `<script id="framescroll-config" type="application/json">{...}</script>`
pub const CONFIG_ELEMENT_ID: &str = "framescroll-config";

/// Read the inline config block, falling back to defaults when it is
/// missing or invalid.
pub fn load_config() -> PlayerConfig {
    let text = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());
    let Some(text) = text else {
        return PlayerConfig::default();
    };
    match PlayerConfig::from_json(&text) {
        Ok(config) => {
            log::info!("Loaded player config: {} frames", config.total_frames);
            config
        }
        Err(e) => {
            log::warn!("{e}; using default player config");
            PlayerConfig::default()
        }
    }
}
