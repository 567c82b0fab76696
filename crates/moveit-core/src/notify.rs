//! Notification and sound sinks.
//!
//! Sessions only ever talk to these traits. Denied permission is an
//! expected outcome and every delivery failure is non-fatal: the caller
//! logs it and carries on with the transition.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Whether the user allows notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
}

/// Capability to show the user a notification.
pub trait Notifier: Send {
    /// Ask the user for permission. Called once per session.
    fn request_permission(&mut self) -> Permission;

    /// Current permission without prompting.
    fn permission(&self) -> Permission;

    /// Display a notification.
    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Capability to play the short "new challenge" cue.
pub trait AudioCue: Send {
    fn play(&mut self) -> Result<(), NotifyError>;
}

/// Writes notifications as a line of text to any writer.
///
/// Permission is decided up front by configuration; requesting it just
/// reports that decision.
pub struct TerminalNotifier<W: Write + Send> {
    out: W,
    allowed: bool,
    permission: Permission,
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W, allowed: bool) -> Self {
        Self {
            out,
            allowed,
            permission: Permission::Default,
        }
    }
}

impl TerminalNotifier<std::io::Stderr> {
    pub fn stderr(allowed: bool) -> Self {
        Self::new(std::io::stderr(), allowed)
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn request_permission(&mut self) -> Permission {
        self.permission = if self.allowed {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission != Permission::Granted {
            return Err(NotifyError::PermissionDenied);
        }
        writeln!(self.out, "[{title}] {body}")
            .and_then(|_| self.out.flush())
            .map_err(|source| NotifyError::Delivery {
                kind: "notification",
                source,
            })
    }
}

/// Rings the terminal bell.
pub struct TerminalBell<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalBell<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> AudioCue for TerminalBell<W> {
    fn play(&mut self) -> Result<(), NotifyError> {
        self.out
            .write_all(b"\x07")
            .and_then(|_| self.out.flush())
            .map_err(|source| NotifyError::Delivery {
                kind: "sound",
                source,
            })
    }
}

/// Sink that never notifies and never plays anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn notify(&mut self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::PermissionDenied)
    }
}

impl AudioCue for Silent {
    fn play(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// What a [`Recorder`] has seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorded {
    pub permission_requests: usize,
    pub notifications: Vec<(String, String)>,
    pub sounds: usize,
}

/// Notifier and audio sink that remembers every call.
///
/// Clones share one log, so a handle kept outside a session can assert on
/// what the session did.
#[derive(Debug, Clone)]
pub struct Recorder {
    log: Arc<Mutex<Recorded>>,
    permission: Permission,
    grant: bool,
}

impl Recorder {
    /// `grant` decides the answer to `request_permission`.
    pub fn new(grant: bool) -> Self {
        Self {
            log: Arc::default(),
            permission: Permission::Default,
            grant,
        }
    }

    pub fn recorded(&self) -> Recorded {
        self.log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn with_log(&self, f: impl FnOnce(&mut Recorded)) {
        let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut log);
    }
}

impl Notifier for Recorder {
    fn request_permission(&mut self) -> Permission {
        self.with_log(|log| log.permission_requests += 1);
        self.permission = if self.grant {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission != Permission::Granted {
            return Err(NotifyError::PermissionDenied);
        }
        self.with_log(|log| log.notifications.push((title.to_string(), body.to_string())));
        Ok(())
    }
}

impl AudioCue for Recorder {
    fn play(&mut self) -> Result<(), NotifyError> {
        self.with_log(|log| log.sounds += 1);
        Ok(())
    }
}
