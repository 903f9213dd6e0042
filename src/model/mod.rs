pub mod cohort;
pub mod params;
pub mod records;
pub mod results;

#[cfg(test)]
#[path = "../../tests/src_inline/model/tests.rs"]
mod tests;
