use serde::{Deserialize, Deserializer};

/// A field of a partial-update payload.
///
/// Distinguishes a key that was left out of the JSON body from a key that
/// was sent as `null`. Use with `#[serde(default)]` so absent keys become
/// [`Patch::Missing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    /// The new value, if one was sent.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Apply to a nullable target: `Null` clears it, `Value` replaces it.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v),
        }
    }

    /// Apply to a required target. `Null` is treated like `Missing`.
    pub fn apply_required(self, target: &mut T) {
        if let Patch::Value(v) = self {
            *target = v;
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        assignee_id: Patch<i64>,
    }

    #[test]
    fn test_absent_null_and_value() {
        let body: Body = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(body.name, Patch::Missing);
        assert_eq!(body.assignee_id, Patch::Null);

        let body: Body = serde_json::from_str(r#"{"name": "Draft", "assignee_id": 7}"#).unwrap();
        assert_eq!(body.name, Patch::Value("Draft".to_string()));
        assert_eq!(body.assignee_id.value(), Some(&7));
    }

    #[test]
    fn test_apply_to_nullable() {
        let mut target = Some(3);
        Patch::Missing.apply_to(&mut target);
        assert_eq!(target, Some(3));
        Patch::Null.apply_to(&mut target);
        assert_eq!(target, None);
        Patch::Value(9).apply_to(&mut target);
        assert_eq!(target, Some(9));
    }

    #[test]
    fn test_apply_required_ignores_null() {
        let mut target = "old".to_string();
        Patch::Null.apply_required(&mut target);
        assert_eq!(target, "old");
        Patch::Value("new".to_string()).apply_required(&mut target);
        assert_eq!(target, "new");
    }
}
