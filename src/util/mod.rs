pub mod database;
pub mod io;
