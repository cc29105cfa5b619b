//! # Declarative registration for components.
//!
//! A component type describes its handlers once, in a [`HandlerTable`], and
//! every instance is wired to the emitter at construction through
//! [`Emitter::attach`](crate::Emitter::attach):
//!
//! ```text
//! impl EventComponent for Cart {
//!     fn handlers() -> HandlerTable<Self> {
//!         HandlerTable::new()
//!             .on("cart:add", Cart::add)                 // fire
//!             .on_callback("cart:check", Cart::check)    // callback
//!     }
//! }
//!
//! let cart = bus.attach(Arc::new(Cart::default()));
//!     └─► for (service, method) in Cart::handlers(): register(service, method bound to cart)
//! ```
//!
//! [`PhaseScope`] is the companion for lifecycle methods: it runs a closure and
//! triggers a phase transition before or after it.

mod scope;
mod table;

pub use scope::{PhaseOrder, PhaseScope};
pub use table::{EventComponent, HandlerTable};
