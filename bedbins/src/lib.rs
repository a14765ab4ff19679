#[cfg(feature = "core")]
#[doc(inline)]
pub use bedbins_core as core;

#[cfg(feature = "overlap")]
#[doc(inline)]
pub use bedbins_overlap as overlap;
