use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::SnowflakeId;

impl Serialize for SnowflakeId {
    /// Serializes the ID as its native integer representation.
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.to_raw().serialize(s)
    }
}

impl<'de> Deserialize<'de> for SnowflakeId {
    /// Deserializes the ID from its native integer representation, rejecting
    /// values with the reserved bit set.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let id = Self::from_raw(u64::deserialize(d)?);
        if !id.is_valid() {
            return Err(de::Error::custom(format_args!(
                "snowflake ID {id} sets the reserved bit"
            )));
        }
        Ok(id)
    }
}

/// Serialize a [`SnowflakeId`] as a decimal string.
///
/// JavaScript numbers lose precision past 2^53, so APIs consumed from the
/// browser usually ship IDs as strings. Use with `#[serde(with = ...)]`:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use snowmint::SnowflakeId;
///
/// #[derive(Serialize, Deserialize)]
/// struct Event {
///     #[serde(with = "snowmint::as_string")]
///     id: SnowflakeId,
/// }
///
/// let event = Event { id: SnowflakeId::from_components(1, 2, 3) };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"id":"4202499"}"#);
/// ```
pub mod as_string {
    use super::{Deserialize, Deserializer, Serializer, de};
    use crate::SnowflakeId;

    /// Serialize a snowflake ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    /// Deserialize a snowflake ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the string is
    /// not a non-negative 64-bit signed integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnowflakeId, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(d)?;
        s.parse().map_err(de::Error::custom)
    }
}
