//! Listing providers
//!
//! Each upstream service gets an adapter implementing [`ListingProvider`].
//! Adapters only know how to ask for data; the response bodies go through
//! the shared extractor, normalizer and XMLTV builder.

pub mod factory;
pub mod fuel;
pub mod gracenote;
pub mod traits;

pub use factory::ProviderFactory;
pub use fuel::FuelProvider;
pub use gracenote::GracenoteProvider;
pub use traits::{EmptyTitlePolicy, FetchSchedule, ListingProvider, ProviderKind};
