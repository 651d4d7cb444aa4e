pub mod image;
pub mod stream;

pub use image::ImageUrls;
pub use stream::{AlternativeStream, StreamOptions, StreamUrlBuilder};

pub mod metadata_service;
pub use metadata_service::{MetadataError, MetadataService, TmdbMetadataService};

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{CatalogError, CatalogPage, CatalogService};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod user_content_service;
pub mod user_content_service_impl;
pub use user_content_service::{UserContentError, UserContentService};
pub use user_content_service_impl::SeaOrmUserContentService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, Registration, UserProfile};
pub use auth_service_impl::SeaOrmAuthService;
