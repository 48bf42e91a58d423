/// (De)serializes a `chrono::Duration` as a `H:MM:SS` race time.
pub mod race_time {
    use chrono::Duration;
    use schemars::gen::SchemaGenerator;
    use schemars::schema::{InstanceType, Schema, SchemaObject};
    use serde::de::{Error as DeError, IntoDeserializer, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::time::{format_race_time, parse_race_time};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_race_time(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_race_time(&s).ok_or_else(|| {
            D::Error::invalid_value(
                Unexpected::Str(&s),
                &"a race time in the format H:MM:SS",
            )
        })
    }

    pub fn serialize_option<S>(
        option_duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match option_duration {
            Some(d) => serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize_option<'de, D>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        match s {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => {
                let duration = deserialize(s.as_str().into_deserializer())?;
                Ok(Some(duration))
            }
            None => Ok(None),
        }
    }

    pub fn schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("H:MM:SS".to_owned()),
            ..Default::default()
        }
        .into()
    }
}
