pub mod row_store;

pub use row_store::RowStore;
