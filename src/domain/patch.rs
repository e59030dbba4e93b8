use serde::{Deserialize, Deserializer};

/// Tri-state field for partial updates: a missing key leaves the stored
/// value alone, an explicit `null` clears it, a value replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// Merge against the currently stored value of a nullable column.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(value) => Some(value),
        }
    }
}

// Relies on `#[serde(default)]` at the field site: serde only calls this
// when the key is present, so `null` maps to Clear and absence to Keep.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        week: Patch<i32>,
    }

    #[test]
    fn missing_key_keeps() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.week, Patch::Keep);
        assert_eq!(payload.week.resolve(Some(3)), Some(3));
    }

    #[test]
    fn null_clears() {
        let payload: Payload = serde_json::from_str(r#"{"week": null}"#).unwrap();
        assert_eq!(payload.week, Patch::Clear);
        assert_eq!(payload.week.resolve(Some(3)), None);
    }

    #[test]
    fn value_sets() {
        let payload: Payload = serde_json::from_str(r#"{"week": 2}"#).unwrap();
        assert_eq!(payload.week, Patch::Set(2));
        assert_eq!(payload.week.resolve(Some(3)), Some(2));
    }
}
