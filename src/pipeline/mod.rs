pub mod stage1_frequencies;
pub mod stage2_cohort;
pub mod stage3_units;
pub mod stage4_compare;
pub mod stage5_report;
