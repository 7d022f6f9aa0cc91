pub mod mysql;

pub use mysql::MySqlDataSource;
