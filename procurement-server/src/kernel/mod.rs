pub mod db;
pub mod deadline;
pub mod entities;
pub mod versioning;

#[cfg(test)]
pub mod test_utils;
