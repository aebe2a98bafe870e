//! Wide-integer identifier type for domain entities.
//!
//! Upstream clients exchange entity ids as decimal strings because several
//! id ranges exceed the 53-bit precision of a JSON number in browser
//! runtimes. `EntityId` keeps the value as an `i64` end-to-end and always
//! serializes back out as text, so `9223372036854775807` survives a full
//! round trip without ever passing through a float.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub i64);

impl EntityId {
    #[inline]
    pub const fn new(v: i64) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parse a header or query value. Accepts a bare decimal string;
    /// empty strings and the literals `null`/`undefined` (sent by sloppy
    /// clients) parse to `None`.
    pub fn parse_optional(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
            return None;
        }
        trimmed.parse::<i64>().ok().map(Self)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> i64 {
        id.0
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Tokens arrive as strings; accept numbers too for tooling that
        // still emits them.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(EntityId(v)),
            Raw::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(EntityId)
                .map_err(serde::de::Error::custom),
        }
    }
}

// SQLx codec: stored as BIGINT.
impl sqlx::Type<sqlx::Postgres> for EntityId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for EntityId {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for EntityId {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(EntityId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let id = EntityId(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""42""#);
    }

    #[test]
    fn test_max_i64_round_trip() {
        let id = EntityId(i64::MAX);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""9223372036854775807""#);
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.to_string(), "9223372036854775807");
    }

    #[test]
    fn test_deserialize_from_number() {
        let id: EntityId = serde_json::from_str("17").unwrap();
        assert_eq!(id, EntityId(17));
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(EntityId::parse_optional("12"), Some(EntityId(12)));
        assert_eq!(EntityId::parse_optional(" 12 "), Some(EntityId(12)));
        assert_eq!(EntityId::parse_optional(""), None);
        assert_eq!(EntityId::parse_optional("null"), None);
        assert_eq!(EntityId::parse_optional("undefined"), None);
        assert_eq!(EntityId::parse_optional("abc"), None);
    }

    #[test]
    fn test_from_str() {
        let id: EntityId = "9223372036854775807".parse().unwrap();
        assert_eq!(id.into_inner(), i64::MAX);
        assert!("not-a-number".parse::<EntityId>().is_err());
    }
}
