// Bypass header catalog for authprobe
// Header-sets tried against every endpoint, in this order

/// A named set of spoofed headers. Every catalog entry carries exactly one
/// header, and the set is named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSet {
    pub name: &'static str,
    pub headers: &'static [(&'static str, &'static str)],
}

pub const BYPASS_HEADER_SETS: &[HeaderSet] = &[
    HeaderSet { name: "X-Forwarded-For", headers: &[("X-Forwarded-For", "127.0.0.1")] },
    HeaderSet { name: "X-Originating-IP", headers: &[("X-Originating-IP", "127.0.0.1")] },
    HeaderSet { name: "X-Client-IP", headers: &[("X-Client-IP", "127.0.0.1")] },
    HeaderSet { name: "X-Remote-IP", headers: &[("X-Remote-IP", "127.0.0.1")] },
    HeaderSet { name: "Forwarded", headers: &[("Forwarded", "for=127.0.0.1")] },
    HeaderSet { name: "Authorization", headers: &[("Authorization", "Bearer faketoken")] },
    HeaderSet { name: "Cookie", headers: &[("Cookie", "session=fakecookie")] },
];

pub fn bypass_header_sets() -> &'static [HeaderSet] {
    BYPASS_HEADER_SETS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_set_is_named_after_its_single_header() {
        assert_eq!(BYPASS_HEADER_SETS.len(), 7);
        for set in BYPASS_HEADER_SETS {
            assert_eq!(set.headers.len(), 1);
            assert_eq!(set.headers[0].0, set.name);
        }
    }
}
