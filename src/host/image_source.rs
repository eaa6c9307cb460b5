use framescroll_core::{FrameIndex, FrameLoadError, FrameSource, PlayerConfig};
use futures::future::LocalBoxFuture;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

/// Loads frames as `<img>` elements and waits for them to decode.
pub struct ImageFrameSource {
    config: PlayerConfig,
}

impl ImageFrameSource {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl FrameSource for ImageFrameSource {
    type Image = HtmlImageElement;

    fn fetch(&self, index: FrameIndex) -> LocalBoxFuture<'static, Result<HtmlImageElement, FrameLoadError>> {
        let path = self.config.frame_path(index);
        Box::pin(load_image(index, path))
    }
}

async fn load_image(index: FrameIndex, path: String) -> Result<HtmlImageElement, FrameLoadError> {
    let img = HtmlImageElement::new()
        .map_err(|e| FrameLoadError::fetch(index, &path, format!("{e:?}")))?;

    let loaded = js_sys::Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(&path);
    let result = JsFuture::from(loaded).await;
    img.set_onload(None);
    img.set_onerror(None);
    if result.is_err() {
        return Err(FrameLoadError::fetch(index, path, "image request failed"));
    }

    // onload fires before the bitmap is guaranteed decoded
    if JsFuture::from(img.decode()).await.is_err() {
        return Err(FrameLoadError::decode(index, path));
    }
    Ok(img)
}
