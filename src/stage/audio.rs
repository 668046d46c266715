// HtmlAudioElement transport. One element per session; the previous one is
// paused and detached before a new track starts.
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlAudioElement;

use crate::error::TransportError;
use crate::session::AudioTransport;

pub struct HtmlAudio {
    element: Option<HtmlAudioElement>,
    on_ended: Closure<dyn FnMut()>,
    on_rejected: Closure<dyn FnMut(JsValue)>,
}

impl HtmlAudio {
    pub fn new() -> Self {
        Self {
            element: None,
            on_ended: Closure::wrap(Box::new(super::on_audio_ended) as Box<dyn FnMut()>),
            // play() rejects asynchronously (autoplay policy, missing file);
            // the session keeps running on the clock.
            on_rejected: Closure::wrap(Box::new(|err: JsValue| {
                log::warn!("audio playback failed: {err:?}; continuing without audio");
            }) as Box<dyn FnMut(JsValue)>),
        }
    }
}

impl AudioTransport for HtmlAudio {
    fn play(&mut self, track: &str) -> Result<(), TransportError> {
        self.stop();
        let el = HtmlAudioElement::new_with_src(track)
            .map_err(|e| TransportError::PlaybackFailed(format!("{e:?}")))?;
        el.set_onended(Some(self.on_ended.as_ref().unchecked_ref()));
        let pending = el
            .play()
            .map_err(|e| TransportError::PlaybackFailed(format!("{e:?}")))?;
        let _ = pending.catch(&self.on_rejected);
        self.element = Some(el);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(el) = self.element.take() {
            el.set_onended(None);
            let _ = el.pause();
        }
    }
}
