pub mod http2;
pub mod push;
