pub mod protocol {
    pub use periscope_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use periscope_server::*;
}
