pub mod builders;
pub mod db;
pub mod server;

#[allow(unused_imports)]
pub use builders::PropertyBuilder;
pub use db::TestDb;
#[allow(unused_imports)]
pub use server::TestServer;
