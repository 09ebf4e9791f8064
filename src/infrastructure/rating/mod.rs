//! Rating infrastructure - remote rating service client

mod http_client;

pub use http_client::{HttpRatingClient, RatingApiConfig};
