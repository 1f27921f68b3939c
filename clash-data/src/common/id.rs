use std::{
    borrow::Borrow,
    fmt,
    fmt::Display,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
    de::Visitor,
};

/// An ID for a resource.
///
/// IDs are normalized on construction: only ASCII letters and digits are kept, and letters are
/// lowercased. `"Vine Whip"`, `"vine-whip"`, and `"vinewhip"` are all the same ID.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(String);

impl Id {
    fn normalize(value: &str) -> String {
        value
            .chars()
            .filter_map(|c| match c {
                '0'..='9' | 'a'..='z' => Some(c),
                'A'..='Z' => Some(c.to_ascii_lowercase()),
                _ => None,
            })
            .collect()
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is the ID empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(Self::normalize(value))
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for Id {
    type Err = core::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Id::from(v))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(IdVisitor)
    }
}

#[cfg(test)]
mod id_test {
    use crate::{
        Id,
        test_util::{
            test_string_deserialization,
            test_string_serialization,
        },
    };

    #[test]
    fn normalizes_names() {
        assert_eq!(Id::from("Vine Whip"), Id::from("vinewhip"));
        assert_eq!(Id::from("Vine-Whip"), Id::from("VINEWHIP"));
        assert_eq!(Id::from("Mr. Mime").as_str(), "mrmime");
    }

    #[test]
    fn serializes_normalized_string() {
        test_string_serialization(Id::from("Tackle"), "tackle");
        test_string_deserialization("Thunder Shock", Id::from("thundershock"));
    }
}
