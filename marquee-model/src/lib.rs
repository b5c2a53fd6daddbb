//! Core data model definitions shared across Marquee crates.
//!
//! Entities are the normalized shapes held by the catalog cache; raw records
//! mirror the metadata API payloads they are normalized from.

pub mod category;
pub mod entity;
pub mod error;
pub mod ids;
pub mod image;
pub mod listing;
pub mod movie;
pub mod person;
pub mod view_style;

pub use category::{MovieCategory, title_from_route};
pub use entity::{CatalogEntity, Namespace};
pub use error::{NormalizeError, Result as ModelResult};
pub use ids::{MovieId, PersonId};
pub use image::{BackdropSize, ImageSize, PosterSize, ProfileSize, image_url};
pub use listing::ListingPage;
pub use movie::{MovieEntity, RawMovie};
pub use person::{PersonEntity, RawPerson};
pub use view_style::ViewStyle;
