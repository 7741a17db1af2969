//! Raw query string decoding and encoding

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped when encoding (RFC 3986 unreserved)
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Decode `a=1&b=2` (an optional leading `?` is dropped) into ordered pairs.
///
/// `+` decodes to a space; invalid UTF-8 is replaced lossily.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(component: &str) -> String {
    let component = component.replace('+', " ");
    percent_decode_str(&component).decode_utf8_lossy().into_owned()
}

/// Encode ordered pairs as a query string
pub fn encode_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k.as_ref(), QUERY_COMPONENT),
                utf8_percent_encode(v.as_ref(), QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let pairs = parse_query_string("?filter[age]=gt:10&sort=-age");
        assert_eq!(
            pairs,
            vec![
                ("filter[age]".to_string(), "gt:10".to_string()),
                ("sort".to_string(), "-age".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_percent_encoded() {
        let pairs = parse_query_string("filter%5Bname%5D=John+Smith%2C%20Jr&include");
        assert_eq!(pairs[0].0, "filter[name]");
        assert_eq!(pairs[0].1, "John Smith, Jr");
        assert_eq!(pairs[1], ("include".to_string(), String::new()));
    }

    #[test]
    fn test_encode_round_trip() {
        let encoded = encode_query_string(&[("page[offset]", "10"), ("sort", "-age")]);
        assert_eq!(encoded, "page%5Boffset%5D=10&sort=-age");
        let decoded = parse_query_string(&encoded);
        assert_eq!(decoded[0], ("page[offset]".to_string(), "10".to_string()));
    }
}
