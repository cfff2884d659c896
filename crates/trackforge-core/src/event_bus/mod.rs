//! # Model Event Bus
//!
//! Publish/subscribe for the segment model's observable stores.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trackforge_core::event_bus::{EventCategory, EventFilter, ModelEvent, ModelEventBus};
//!
//! let bus = ModelEventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Preview]),
//!     |event| {
//!         if let ModelEvent::PreviewSegmentChanged { segment } = event {
//!             println!("Preview: {:?}", segment);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
