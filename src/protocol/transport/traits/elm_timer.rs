//! Asynchronous timer abstraction providing the response windows and the
//! controller settle delays.
use embassy_time::Duration;

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait ElmTimer {
    /// Asynchronously wait for `duration`.
    fn delay<'a>(&'a mut self, duration: Duration) -> impl core::future::Future<Output = ()> + 'a;
}
