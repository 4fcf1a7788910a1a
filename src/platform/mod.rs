//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time (`performance.now()` / `Instant`)
//! - Wall-clock time for record ids
//! - The local UTC offset used to group history by day
//! - Mapping pointer coordinates onto the logical canvas
//! - Tracking frame/timer callbacks handed to the browser

use chrono::{FixedOffset, Offset, Utc};
use glam::Vec2;

/// Monotonic milliseconds since page load / first call
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn epoch_ms() -> i64 {
    js_sys::Date::now() as i64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Offset of the user's local time from UTC
#[cfg(target_arch = "wasm32")]
pub fn local_offset() -> FixedOffset {
    // getTimezoneOffset is UTC minus local, in minutes
    let minutes = js_sys::Date::new_0().get_timezone_offset();
    FixedOffset::west_opt((minutes * 60.0) as i32).unwrap_or_else(|| Utc.fix())
}

/// Native builds group by UTC days
#[cfg(not(target_arch = "wasm32"))]
pub fn local_offset() -> FixedOffset {
    Utc.fix()
}

/// Displayed box of the canvas on screen (CSS px)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Convert a client-space pointer position to logical canvas coordinates.
///
/// The canvas drawing buffer is `logical` px but is displayed stretched to
/// `rect`, so each axis is scaled by logical/displayed.
pub fn client_to_canvas(client: Vec2, rect: DisplayRect, logical: Vec2) -> Vec2 {
    let scale = Vec2::new(
        if rect.width > 0.0 { logical.x / rect.width } else { 1.0 },
        if rect.height > 0.0 { logical.y / rect.height } else { 1.0 },
    );
    (client - Vec2::new(rect.left, rect.top)) * scale
}

/// A browser callback (animation frame or timeout) that has been armed but
/// not yet run, with the key it was armed for (a deadline, or `()`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmedCallback<K> {
    armed: Option<(i32, K)>,
}

impl<K> Default for ArmedCallback<K> {
    fn default() -> Self {
        Self { armed: None }
    }
}

impl<K: Copy + PartialEq> ArmedCallback<K> {
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn key(&self) -> Option<K> {
        self.armed.map(|(_, key)| key)
    }

    /// True when the armed callback does not already cover `next`
    pub fn needs_rearm(&self, next: Option<K>) -> bool {
        self.key() != next
    }

    pub fn arm(&mut self, handle: i32, key: K) {
        self.armed = Some((handle, key));
    }

    /// Forget the callback, returning its handle so the host can cancel it
    pub fn take(&mut self) -> Option<i32> {
        self.armed.take().map(|(handle, _)| handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_to_canvas_scales_each_axis() {
        let rect = DisplayRect {
            left: 10.0,
            top: 20.0,
            width: 500.0,
            height: 300.0,
        };
        let p = client_to_canvas(Vec2::new(260.0, 170.0), rect, Vec2::new(1000.0, 600.0));
        assert_eq!(p, Vec2::new(500.0, 300.0));
    }

    #[test]
    fn test_client_to_canvas_degenerate_rect() {
        let rect = DisplayRect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
        let p = client_to_canvas(Vec2::new(5.0, 7.0), rect, Vec2::new(1000.0, 600.0));
        assert_eq!(p, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn test_wake_rearms_only_when_deadline_moves() {
        let mut wake = ArmedCallback::<f64>::default();
        assert!(!wake.needs_rearm(None));
        assert!(wake.needs_rearm(Some(1000.0)));

        wake.arm(7, 1000.0);
        // Every frame asks again for the same deadline
        for _ in 0..60 {
            assert!(!wake.needs_rearm(Some(1000.0)));
        }
        assert!(wake.needs_rearm(Some(1500.0)));
        assert!(wake.needs_rearm(None));

        assert_eq!(wake.take(), Some(7));
        assert!(!wake.is_armed());
        assert_eq!(wake.take(), None);
    }

    #[test]
    fn test_frame_callback_cancel_releases_handle() {
        let mut frame = ArmedCallback::<()>::default();
        frame.arm(3, ());
        assert!(frame.is_armed());
        assert!(!frame.needs_rearm(Some(())));
        assert_eq!(frame.take(), Some(3));
        assert!(frame.needs_rearm(Some(())));

        frame.arm(4, ());
        assert_eq!(frame.key(), Some(()));
        assert_eq!(frame.take(), Some(4));
    }

    #[test]
    fn test_native_offset_is_utc() {
        assert_eq!(local_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_now_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
