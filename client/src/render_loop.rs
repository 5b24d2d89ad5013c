use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Drives the poll-and-redraw cycle via `requestAnimationFrame`.
///
/// Unlike a vsync-paced dirty-flag scheduler, each iteration runs to
/// completion (including the state fetch, the loop's single suspension
/// point) before the next frame is requested. A slow backend therefore
/// lowers the frame rate instead of stacking overlapping requests.
///
/// Dropping the handle cancels the pending callback and stops the loop.
pub struct FrameLoop {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    raf_id: Cell<Option<i32>>,
    stopped: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    /// Start the perpetual loop. `step` receives the frame timestamp in
    /// milliseconds and is awaited before the next frame is scheduled.
    pub fn start<F, Fut>(step: F) -> Self
    where
        F: Fn(f64) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            raf_id: Cell::new(None),
            stopped: Cell::new(false),
            callback: RefCell::new(None),
        });

        let step = Rc::new(step);
        let inner_cb = inner.clone();
        let cb = Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
            inner_cb.raf_id.set(None);
            if inner_cb.stopped.get() {
                return;
            }
            let step = step.clone();
            let inner_next = inner_cb.clone();
            spawn_local(async move {
                step(now_ms).await;
                inner_next.schedule();
            });
        });
        *inner.callback.borrow_mut() = Some(cb);

        inner.schedule();
        Self { inner }
    }
}

impl Inner {
    fn schedule(&self) {
        if self.stopped.get() || self.raf_id.get().is_some() {
            return;
        }
        let cb_ref = self.callback.borrow();
        let (Some(window), Some(cb)) = (self.window.as_ref(), cb_ref.as_ref()) else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            self.raf_id.set(Some(id));
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.inner.stopped.set(true);
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        // Break the callback->inner reference cycle on teardown.
        self.inner.callback.borrow_mut().take();
    }
}

/// Frames-per-second over a rolling one-second window. An explicit struct
/// threaded through the loop, not ambient state captured in a closure.
#[derive(Debug, Clone, Copy)]
pub struct FpsCounter {
    frames: u32,
    window_start: f64,
}

impl FpsCounter {
    pub fn new(now_ms: f64) -> Self {
        Self {
            frames: 0,
            window_start: now_ms,
        }
    }

    /// Count one frame. Once at least a second has elapsed, returns the
    /// completed window's frame count and starts a new window.
    pub fn frame(&mut self, now_ms: f64) -> Option<u32> {
        self.frames += 1;
        if now_ms - self.window_start >= 1000.0 {
            let fps = self.frames;
            self.frames = 0;
            self.window_start = now_ms;
            Some(fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FpsCounter;

    #[test]
    fn no_rate_before_the_window_closes() {
        let mut fps = FpsCounter::new(0.0);
        for i in 1..60 {
            assert_eq!(fps.frame(i as f64 * 16.0), None);
        }
    }

    #[test]
    fn window_close_reports_the_count_including_the_closing_frame() {
        let mut fps = FpsCounter::new(0.0);
        for i in 1..=59 {
            assert_eq!(fps.frame(i as f64 * 16.0), None);
        }
        assert_eq!(fps.frame(1000.0), Some(60));
    }

    #[test]
    fn window_resets_after_reporting() {
        let mut fps = FpsCounter::new(0.0);
        assert_eq!(fps.frame(1000.0), Some(1));
        assert_eq!(fps.frame(1500.0), None);
        assert_eq!(fps.frame(2000.0), Some(2));
    }

    #[test]
    fn slow_frames_still_report() {
        // One frame every two seconds: each frame closes its own window.
        let mut fps = FpsCounter::new(0.0);
        assert_eq!(fps.frame(2000.0), Some(1));
        assert_eq!(fps.frame(4000.0), Some(1));
    }
}
