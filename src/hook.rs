//! The boundary with the native hook: the inbound raw-event callback and the
//! outbound control surface a backend provides.

use crate::error::{Error, Result};
use crate::raw::RawEvent;
use std::sync::Arc;

/// Receives raw records from a hook backend.
///
/// Called once per native event, on whatever thread the backend delivers
/// from. Implementations must not block.
pub trait RawEventHandler: Send + Sync {
    /// Called when a native input event occurs.
    fn on_raw_event(&self, event: RawEvent);
}

/// Implement RawEventHandler for closures.
impl<F> RawEventHandler for F
where
    F: Fn(RawEvent) + Send + Sync,
{
    fn on_raw_event(&self, event: RawEvent) {
        self(event);
    }
}

/// A native input hook.
///
/// The dispatcher installs the hook on `start` and removes it on `stop`.
/// Everything about how events are captured (polling, callbacks, event
/// taps) is the backend's business.
pub trait HookBackend: Send + Sync {
    /// Install the hook and begin delivering events to `handler`.
    ///
    /// `debug` asks the backend for verbose native logging.
    fn install(&self, handler: Arc<dyn RawEventHandler>, debug: bool) -> Result<()>;

    /// Remove the hook. No event may be delivered after this returns.
    fn uninstall(&self) -> Result<()>;

    /// Control whether mouse click/press/release events are swallowed
    /// (`suppress = true`) instead of reaching the OS window chain.
    fn set_click_propagation(&self, suppress: bool) -> Result<()> {
        let _ = suppress;
        Err(Error::NotSupported(
            "click propagation control is not available for this backend".into(),
        ))
    }

    /// Toggle verbose native logging.
    fn set_debug(&self, enabled: bool) {
        let _ = enabled;
    }

    /// Release native resources. Called with the hook already uninstalled.
    fn unload(&self) -> Result<()> {
        Ok(())
    }

    /// Re-acquire native resources after [`HookBackend::unload`].
    fn load(&self) -> Result<()> {
        Ok(())
    }
}

impl<B: HookBackend + ?Sized> HookBackend for Arc<B> {
    fn install(&self, handler: Arc<dyn RawEventHandler>, debug: bool) -> Result<()> {
        (**self).install(handler, debug)
    }

    fn uninstall(&self) -> Result<()> {
        (**self).uninstall()
    }

    fn set_click_propagation(&self, suppress: bool) -> Result<()> {
        (**self).set_click_propagation(suppress)
    }

    fn set_debug(&self, enabled: bool) {
        (**self).set_debug(enabled)
    }

    fn unload(&self) -> Result<()> {
        (**self).unload()
    }

    fn load(&self) -> Result<()> {
        (**self).load()
    }
}
