use crate::{
    error::ErrorClass,
    value::{ColumnType, ScalarValue, ValueLimits},
};
use std::cmp::Ordering;

fn region<V: ScalarValue>(limits: ValueLimits) -> Vec<u8> {
    vec![0; V::encoded_width(limits)]
}

#[test]
fn numeric_widths_match_their_primitive_size() {
    let limits = ValueLimits::default();

    assert_eq!(i64::encoded_width(limits), 8);
    assert_eq!(f64::encoded_width(limits), 8);
    assert_eq!(f32::encoded_width(limits), 4);
    assert_eq!(String::encoded_width(ValueLimits::new(16)), 20);
}

#[test]
fn long_region_is_big_endian() {
    let mut dst = region::<i64>(ValueLimits::default());
    0x0102_0304_0506_0708_i64.encode(&mut dst);

    assert_eq!(dst, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(i64::decode(&dst).expect("long region should decode"), 0x0102_0304_0506_0708);
}

#[test]
fn float_regions_preserve_bit_patterns() {
    let mut dst = region::<f64>(ValueLimits::default());
    (-0.0_f64).encode(&mut dst);
    let back = f64::decode(&dst).expect("double region should decode");
    assert!(back.is_sign_negative());

    let mut dst = region::<f32>(ValueLimits::default());
    f32::NAN.encode(&mut dst);
    assert!(f32::decode(&dst).expect("float region should decode").is_nan());
}

#[test]
fn string_region_truncates_on_char_boundary() {
    let limits = ValueLimits::new(5);
    let mut dst = region::<String>(limits);

    // "héllo" is six bytes; the budget of five must not split 'l' or 'é'.
    "héllo".to_string().encode(&mut dst);
    let back = String::decode(&dst).expect("string region should decode");

    assert_eq!(back, "héll");
}

#[test]
fn string_fit_matches_region_truncation() {
    let limits = ValueLimits::new(2);

    assert_eq!("aé".to_string().fit(limits), "a");
    assert_eq!("ab".to_string().fit(limits), "ab");
}

#[test]
fn string_decode_rejects_oversized_length_prefix() {
    let mut dst = region::<String>(ValueLimits::new(4));
    dst[..4].copy_from_slice(&99_u32.to_be_bytes());

    let err = String::decode(&dst).expect_err("oversized prefix must fail");
    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn short_numeric_region_is_corruption() {
    let err = i64::decode(&[1, 2, 3]).expect_err("short region must fail");

    assert_eq!(err.class, ErrorClass::Corruption);
}

#[test]
fn total_cmp_orders_floats_totally() {
    assert_eq!(ScalarValue::total_cmp(&1.0_f64, &2.0), Ordering::Less);
    assert_eq!(ScalarValue::total_cmp(&f64::NAN, &f64::NAN), Ordering::Equal);
    assert_eq!(ScalarValue::total_cmp(&"b".to_string(), &"a".to_string()), Ordering::Greater);
}

#[test]
fn column_types_render_lowercase() {
    assert_eq!(ColumnType::Long.to_string(), "long");
    assert_eq!(<String as ScalarValue>::COLUMN_TYPE, ColumnType::String);
}

#[test]
fn long_from_json_truncates_fractions_toward_zero() {
    use serde_json::json;

    assert_eq!(i64::from_json(&json!(12)), Some(12));
    assert_eq!(i64::from_json(&json!(12.9)), Some(12));
    assert_eq!(i64::from_json(&json!(-12.9)), Some(-12));
    assert_eq!(i64::from_json(&json!(1e300)), Some(i64::MAX));
    assert_eq!(i64::from_json(&json!("12")), None);
}

#[test]
fn string_from_json_only_accepts_strings() {
    use serde_json::json;

    assert_eq!(String::from_json(&json!("a")), Some("a".to_string()));
    assert_eq!(String::from_json(&json!(1)), None);
}
