mod handler;

pub use handler::list;
