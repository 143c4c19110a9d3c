use percent_encoding::{percent_encode, AsciiSet, CONTROLS};

/// https://url.spec.whatwg.org/#fragment-percent-encode-set
const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// https://url.spec.whatwg.org/#query-percent-encode-set
const QUERY: &AsciiSet = &FRAGMENT.add(b'#').add(b'\'');

/// Query values can't contain pair separators and `+` would be read as space.
const QUERY_VALUE: &AsciiSet = &QUERY.add(b'&').add(b'=').add(b'+').add(b'%');

/// `percent_encoding` crate recommends you to create your own set for encoding.
/// To be consistent in the whole codebase - we created a function that can be used
/// for encoding related stuff.
pub fn url_encode(data: &[u8]) -> String {
    percent_encode(data, QUERY_VALUE).to_string()
}
