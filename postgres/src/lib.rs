//! PostgreSQL connection options shared by the catalog crates, plus test
//! utilities for creating and dropping throwaway databases.

pub mod options;
pub mod test_utils;
