// Hotel data client for the TravelHunt web app

// Wire format and flattening
pub mod listing;
pub mod supplier;

// Selection, search and suggestions over flattened listings
pub mod deals;
pub mod filter;
pub mod suggest;

// HTTP client, configuration and view state
pub mod client;
pub mod config;
pub mod state;

// App-level preferences and the room chat assistant
pub mod assistant;
pub mod context;

#[cfg(test)]
mod fixtures;

// Re-export key types for convenience
pub use assistant::{Assistant, ChatMessage, Conversation, Role, RoomContext, TextGenerator};
pub use client::{
    ApiError, ErrorKind, HotelClient, HotelPage, HotelSource, HttpSource, PageRequest, Pagination,
};
pub use config::{load_config, ClientConfig, ConfigError};
pub use context::{AppContext, JsonFileStore, MemoryStore, PreferenceError, PreferenceStore, Theme};
pub use filter::{ListingFilter, SortOrder};
pub use listing::{AmenityFlags, Listings, NormalizedListing, SkipReason, SkippedRoom};
pub use state::{HotelsController, ListingsStore, ListingsView, Operation};
pub use suggest::{Suggestion, SuggestionKind};
