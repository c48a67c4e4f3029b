// Csputil — Session Module
//
// Container selection and key inspection: opens a container from the last
// listing, exports the public and private blobs of both key slots into a
// four-entry key table and saves them on request.

mod error;
mod report;
mod state;

pub use error::SessionError;
pub use report::{ContainerReport, KeyIndex, KeySlotReport};
pub use state::Session;
