pub mod postgres_store;
