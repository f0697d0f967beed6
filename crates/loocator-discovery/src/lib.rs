pub mod coordinator;
pub mod nearby;
mod pagination;
mod pager;
mod query_key;
pub mod settings;
pub mod source;
pub mod store;

#[cfg(test)]
mod testing;

pub use coordinator::{Outcome, QueryCoordinator, Ticket};
pub use nearby::{NearbyListSheet, NearbySnapshot};
pub use pagination::{merge_unique, Paginated};
pub use query_key::QueryKey;
pub use settings::{DiscoverySettings, NearbySettings};
pub use source::{ListingFeed, MarkerFeed, NearbyFeed, PageSource};
pub use store::{DiscoverySnapshot, DiscoveryStore};
