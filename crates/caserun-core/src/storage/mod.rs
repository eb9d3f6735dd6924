pub mod recorder;
pub mod schema;
pub mod store;

pub use recorder::StoreRecorder;
pub use store::{RunRow, Store};
