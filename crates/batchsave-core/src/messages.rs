//! User-facing messages for transfer failures.

use crate::retry::{signature, Classify};

/// Message categories, checked in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Timeout,
    SizeLimit,
    Auth,
    Permission,
    Network,
    Generic,
}

const TABLE: &[(MessageKind, &[&str])] = &[
    (MessageKind::Timeout, &["timeout", "timed out"]),
    (MessageKind::SizeLimit, &["size limit", "too large", "http 413"]),
    (MessageKind::Auth, &["http 401", "unauthorized", "expired"]),
    (MessageKind::Permission, &["http 403", "forbidden", "permission"]),
    (
        MessageKind::Network,
        &["network", "connection", "unreachable", "reset", "dns"],
    ),
];

impl MessageKind {
    pub fn message(self) -> &'static str {
        match self {
            MessageKind::Timeout => "The download timed out. Try a smaller batch.",
            MessageKind::SizeLimit => "A file is too large to download.",
            MessageKind::Auth => "Your session has expired. Please sign in again.",
            MessageKind::Permission => "You are not authorized to download these files.",
            MessageKind::Network => "Network error. Check your connection and try again.",
            MessageKind::Generic => "Download failed. Check your connection and try again.",
        }
    }
}

/// Category of `error`; `Generic` when nothing in the table matches.
pub fn message_kind<E: Classify + ?Sized>(error: &E) -> MessageKind {
    let sig = signature(error);
    TABLE
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| sig.contains(n)))
        .map(|(kind, _)| *kind)
        .unwrap_or(MessageKind::Generic)
}

/// Message to show the user for `error`.
pub fn user_message<E: Classify + ?Sized>(error: &E) -> &'static str {
    message_kind(error).message()
}
