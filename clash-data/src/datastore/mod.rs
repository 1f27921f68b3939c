mod loader;
mod local;

pub use loader::Loader;
pub use local::{
    LocalLoader,
    LocalLoaderTables,
};
