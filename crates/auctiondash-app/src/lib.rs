// Library root: the runtime pieces around the dashboard core, exposed so
// integration tests can drive them without the binary.

pub mod app;
pub mod logging;
pub mod page_server;
pub mod ws_server;
