use super::*;
use chrono::NaiveDate;

#[test]
fn test_parse_valid_revision() {
    let rev = Revision::parse("20180831134224").unwrap();
    assert_eq!(rev.as_str(), "20180831134224");
    assert_eq!(rev.to_string(), "20180831134224");
}

#[test]
fn test_parse_rejects_empty_and_non_digits() {
    assert!(Revision::parse("").is_err());
    assert!(Revision::parse("2018-08-31").is_err());
    assert!(Revision::parse(" 20180831134224").is_err());
}

#[test]
fn test_from_timestamp_is_fourteen_digits() {
    let ts = NaiveDate::from_ymd_opt(2018, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    let rev = Revision::from_timestamp(ts);
    assert_eq!(rev.as_str(), "20180102030405");
    assert_eq!(rev.timestamp(), Some(ts));
}

#[test]
fn test_now_has_generated_shape() {
    let rev = Revision::now();
    assert_eq!(rev.as_str().len(), REVISION_LEN);
    assert!(rev.timestamp().is_some());
}

#[test]
fn test_short_revision_has_no_timestamp() {
    let rev = Revision::parse("42").unwrap();
    assert_eq!(rev.timestamp(), None);
}

#[test]
fn test_ordering_is_chronological() {
    let mut revs = vec![
        Revision::parse("20180103000000").unwrap(),
        Revision::parse("20180101000000").unwrap(),
        Revision::parse("20180102000000").unwrap(),
    ];
    revs.sort();
    let ordered: Vec<&str> = revs.iter().map(|r| r.as_str()).collect();
    assert_eq!(
        ordered,
        vec!["20180101000000", "20180102000000", "20180103000000"]
    );
}

#[test]
fn test_serde_validates() {
    let rev: Revision = serde_yaml::from_str("\"20180101000000\"").unwrap();
    assert_eq!(rev.as_str(), "20180101000000");

    let bad: Result<Revision, _> = serde_yaml::from_str("\"abc\"");
    assert!(bad.is_err());
}
