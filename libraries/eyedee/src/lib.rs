//! Pseudo-anonymous visitor tokens.
//!
//! A token is a random UUID v4 rendered in its canonical hyphenated form. In the browser it comes from
//! `crypto.randomUUID`, everywhere else from the `uuid` crate.

use std::fmt;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["self", "crypto"])]
    fn randomUUID() -> String;
}

pub fn get_uuid() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        randomUUID()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Uuid::new_v4().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct VisitorToken(String);

impl VisitorToken {
    pub fn generate() -> Self {
        Self(get_uuid())
    }

    /// Accepts a previously persisted token. Anything that isn't a hyphenated UUID is rejected so a corrupted
    /// storage entry gets replaced instead of being sent to the server.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() != 36 {
            return None;
        }
        let well_formed = raw.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        });
        well_formed.then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VisitorToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> serde::Deserialize<'de> for VisitorToken {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VisitorToken::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("not a visitor token: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_uuid() {
        let uuid1 = get_uuid();
        let uuid2 = get_uuid();

        assert_ne!(uuid1, uuid2);
        assert_eq!(uuid1.len(), 36);
        assert!(uuid1.chars().filter(|&c| c == '-').count() == 4);
    }

    #[test]
    fn generated_tokens_parse() {
        let token = VisitorToken::generate();
        assert_eq!(VisitorToken::parse(token.as_str()), Some(token));
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let token = VisitorToken::parse(" 6F9619FF-8B86-4D01-B42D-00C04FC964FF\n").unwrap();
        assert_eq!(token.as_str(), "6f9619ff-8b86-4d01-b42d-00c04fc964ff");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(VisitorToken::parse(""), None);
        assert_eq!(VisitorToken::parse("true"), None);
        assert_eq!(VisitorToken::parse("6f9619ff8b864d01b42d00c04fc964ff0000"), None);
        assert_eq!(VisitorToken::parse("6f9619ff-8b86-4d01-b42d-00c04fc964fg"), None);
    }

    #[test]
    fn serde_is_a_plain_string() {
        let token = VisitorToken::parse("6f9619ff-8b86-4d01-b42d-00c04fc964ff").unwrap();
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"6f9619ff-8b86-4d01-b42d-00c04fc964ff\"");
        assert_eq!(serde_json::from_str::<VisitorToken>(&json).unwrap(), token);
        assert!(serde_json::from_str::<VisitorToken>("\"nope\"").is_err());
    }
}
