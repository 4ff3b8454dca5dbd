//! The sync service: frame codec plus the `SyncSession` that drives the
//! three-step protocol over it.

mod framing;
mod session;

pub use session::SyncSession;

#[cfg(test)]
mod tests;
