//! Transient, non-blocking notifications.

use std::time::{Duration, Instant};

use crate::config::TOAST_LIFETIME_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    /// Background colour as RGB bytes
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ToastKind::Success => [0x27, 0xAE, 0x60],
            ToastKind::Error => [0xE7, 0x4C, 0x3C],
            ToastKind::Warning => [0xF3, 0x9C, 0x12],
            ToastKind::Info => [0x34, 0x98, 0xDB],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    expires_at: Instant,
}

/// Visible toasts, oldest first
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.push_at(kind, message, Instant::now());
    }

    fn push_at(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            kind,
            message: message.into(),
            expires_at: now + Duration::from_millis(TOAST_LIFETIME_MS),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message);
    }

    /// Close one toast early
    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    /// Drop every toast whose lifetime has passed
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let mut toasts = Toasts::default();
        let start = Instant::now();
        toasts.push_at(ToastKind::Info, "first", start);
        toasts.push_at(ToastKind::Error, "second", start + Duration::from_millis(2000));

        toasts.expire(start + Duration::from_millis(TOAST_LIFETIME_MS + 1));
        let left: Vec<&str> = toasts.items().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(left, vec!["second"]);

        toasts.expire(start + Duration::from_millis(10_000));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut toasts = Toasts::default();
        toasts.warning("a");
        toasts.success("b");
        let first = toasts.items()[0].id;
        toasts.dismiss(first);
        assert_eq!(toasts.items().len(), 1);
        assert_eq!(toasts.items()[0].kind, ToastKind::Success);
    }
}
