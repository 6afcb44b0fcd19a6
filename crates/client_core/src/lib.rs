pub mod controller;
pub mod error;
pub mod store;

pub use controller::{
    ControllerEvent, FetchEvent, FetchPhase, FetchState, MovieController, DEFAULT_RETRY_DELAY,
};
pub use error::{ControllerError, StoreError};
pub use store::{HttpMovieStore, MovieStore, StoreEndpoints};
