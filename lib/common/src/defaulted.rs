use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record field which may be left unspecified, in which case a documented default applies.
///
/// Wire records use this instead of `Option<T>` so that "absent" can't be confused with
/// "explicitly none"; it's resolved into a concrete value once, at parse time, by
/// [`resolve`](Defaulted::resolve).
///
/// Use with `#[serde(default, skip_serializing_if = "Defaulted::is_default")]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Defaulted<T> {
    Specified(T),
    #[default]
    Default,
}

impl<T> Defaulted<T> {
    #[inline]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    #[inline]
    pub const fn is_specified(&self) -> bool {
        matches!(self, Self::Specified(_))
    }

    /// The specified value, or `default` if none was given.
    #[inline]
    pub fn resolve(self, default: T) -> T {
        match self {
            Self::Specified(v) => v,
            Self::Default => default,
        }
    }

    /// Like [`resolve`](Self::resolve), but the default is computed lazily.
    #[inline]
    pub fn resolve_with(self, default: impl FnOnce() -> T) -> T {
        match self {
            Self::Specified(v) => v,
            Self::Default => default(),
        }
    }

    #[inline]
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Specified(v) => Some(v),
            Self::Default => None,
        }
    }

    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Defaulted<U> {
        match self {
            Self::Specified(v) => Defaulted::Specified(f(v)),
            Self::Default => Defaulted::Default,
        }
    }
}

impl<T: PartialEq> Defaulted<T> {
    /// Emit `value` only if it differs from `default`; used when writing records, so that
    /// default values round-trip as absent fields.
    #[inline]
    pub fn unless_default(value: T, default: &T) -> Self {
        if &value == default {
            Self::Default
        } else {
            Self::Specified(value)
        }
    }
}

impl<T> From<T> for Defaulted<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::Specified(value)
    }
}

impl<T> From<Option<T>> for Defaulted<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Specified(v),
            None => Self::Default,
        }
    }
}

impl<T: Serialize> Serialize for Defaulted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Specified(v) => v.serialize(serializer),
            Self::Default => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Defaulted<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // explicit `null` is treated the same as an absent field
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Sphere {
        #[serde(default, skip_serializing_if = "Defaulted::is_default")]
        radius: Defaulted<f32>,
    }

    #[test]
    fn absent_is_default() {
        let s: Sphere = serde_json::from_str("{}").unwrap();
        assert!(s.radius.is_default());
        assert_eq!(s.radius.resolve(0.5), 0.5);
    }

    #[test]
    fn null_is_default() {
        let s: Sphere = serde_json::from_str(r#"{"radius":null}"#).unwrap();
        assert!(s.radius.is_default());
    }

    #[test]
    fn specified_survives_resolution() {
        let s: Sphere = serde_json::from_str(r#"{"radius":2.0}"#).unwrap();
        assert_eq!(s.radius.resolve(0.5), 2.0);
    }

    #[test]
    fn default_is_skipped_when_writing() {
        let s = Sphere {
            radius: Defaulted::unless_default(0.5, &0.5),
        };
        assert_eq!(serde_json::to_string(&s).unwrap(), "{}");
    }
}
