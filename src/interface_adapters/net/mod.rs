// Network adapter: the single WebSocket entrypoint clients connect through.

pub mod client;

pub use client::ws_handler;
