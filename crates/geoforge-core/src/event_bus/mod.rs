//! # Document Event Bus
//!
//! Observer interface over a document session. The store publishes a
//! typed [`DocumentEvent`] for every buffer it rewrites; UI surfaces
//! subscribe with a filter and receive events synchronously on the
//! publishing thread.
//!
//! There is no global instance: each document session owns its bus.
//!
//! ```rust,ignore
//! use geoforge_core::event_bus::{DocumentBus, EventCategory, EventFilter};
//!
//! let bus = DocumentBus::new();
//! let id = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Buffer]),
//!     |event| println!("{}", event.description()),
//! );
//! bus.unsubscribe(id);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
