use super::*;

#[test]
fn test_format_opt() {
    assert_eq!(format_opt(Some(1.5)), "1.500000");
    assert_eq!(format_opt(None), "NA");
}

#[test]
fn test_format_pvalue() {
    assert_eq!(format_pvalue(Some(0.0312)), "0.0312");
    assert_eq!(format_pvalue(Some(1.0)), "1.0000");
    assert_eq!(format_pvalue(Some(0.0000183)), "1.830e-5");
    assert_eq!(format_pvalue(Some(0.0)), "0.0000");
    assert_eq!(format_pvalue(None), "NA");
}
