mod assignment;
mod category;
mod delivery;
mod depot;
mod location;
mod ownership;
mod product;
mod service_request;
mod user;

pub use assignment::*;
pub use category::*;
pub use delivery::*;
pub use depot::*;
pub use location::*;
pub use ownership::*;
pub use product::*;
pub use service_request::*;
pub use user::*;
