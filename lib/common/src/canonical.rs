use std::fmt::Display;

/// Formatting of floating-point values for use in content-addressed keys.
///
/// Two values produce the same key iff they compare equal, with the exception of NaN (all NaNs
/// share one key). `-0.0` and `0.0` share a key.
pub trait CanonicalFloat: Copy {
    fn canonical(self) -> String;
}

impl<F: num_traits::Float + Display> CanonicalFloat for F {
    fn canonical(self) -> String {
        if self.is_nan() {
            "NaN".to_owned()
        } else if self == F::zero() {
            "0".to_owned()
        } else {
            // `Display` for floats is the shortest representation which round-trips
            format!("{self}")
        }
    }
}

/// Build a canonical key from a discriminant and a list of numeric fields, e.g. `box:1:2:3`.
pub fn canonical_key<F: CanonicalFloat>(discriminant: &str, fields: &[F]) -> String {
    let mut res = String::from(discriminant);
    for f in fields {
        res.push(':');
        res.push_str(&f.canonical());
    }
    res
}
