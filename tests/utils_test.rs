use tastemixer::utils::*;

#[test]
fn test_generate_random_string() {
    let value = generate_random_string(16);

    // Should be exactly the requested length
    assert_eq!(value.len(), 16);

    // Should contain only alphanumeric characters
    assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated values should be different
    let value2 = generate_random_string(16);
    assert_ne!(value, value2);
}

#[test]
fn test_generate_random_string_lengths() {
    for length in [0, 1, 16, 43, 128] {
        let value = generate_random_string(length);
        assert_eq!(value.chars().count(), length);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn test_basic_auth_header() {
    // base64("client:secret")
    assert_eq!(
        basic_auth_header("client", "secret"),
        "Basic Y2xpZW50OnNlY3JldA=="
    );
}

#[test]
fn test_basic_auth_header_keeps_colons_in_secret() {
    // base64("id:a:b")
    assert_eq!(basic_auth_header("id", "a:b"), "Basic aWQ6YTpi");
}

#[test]
fn test_today_format() {
    let today = today();
    assert_eq!(today.len(), 10);
    assert!(chrono::NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
}
