use std::f32::consts::PI;

use crate::{
    data::{LinkJson, PersonalityJson, SeatJson, SpawnPointJson},
    validate::{check_finite, check_max_len, check_required, warn_outside, Validation},
};

pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_TEAM_LEN: usize = 128;
pub const MAX_GROUP_LEN: usize = 128;
pub const MAX_URI_LEN: usize = 2048;
pub const MAX_AGENT_LEN: usize = 128;
pub const MAX_PERSONALITY_LEN: usize = 4096;
pub const MAX_DEFAULT_MESSAGE_LEN: usize = 1024;

pub fn validate_spawn_point(spawn: &SpawnPointJson) -> Validation {
    let mut v = Validation::new();
    check_max_len(&mut v, "title", spawn.title.as_deref(), MAX_TITLE_LEN);
    check_max_len(&mut v, "team", spawn.team.as_deref(), MAX_TEAM_LEN);
    check_max_len(&mut v, "group", spawn.group.as_deref(), MAX_GROUP_LEN);
    v
}

pub fn validate_link(link: &LinkJson) -> Validation {
    let mut v = Validation::new();
    check_required(&mut v, "uri", &link.uri);
    check_max_len(&mut v, "uri", Some(&link.uri), MAX_URI_LEN);
    check_max_len(&mut v, "title", link.title.as_deref(), MAX_TITLE_LEN);
    v
}

pub fn validate_personality(p: &PersonalityJson) -> Validation {
    let mut v = Validation::new();
    check_required(&mut v, "agent", &p.agent);
    check_max_len(&mut v, "agent", Some(&p.agent), MAX_AGENT_LEN);
    check_required(&mut v, "personality", &p.personality);
    check_max_len(&mut v, "personality", Some(&p.personality), MAX_PERSONALITY_LEN);
    check_max_len(
        &mut v,
        "defaultMessage",
        p.default_message.as_deref(),
        MAX_DEFAULT_MESSAGE_LEN,
    );
    v
}

pub fn validate_seat(seat: &SeatJson) -> Validation {
    let mut v = Validation::new();
    check_finite(&mut v, "back", &seat.back);
    check_finite(&mut v, "foot", &seat.foot);
    check_finite(&mut v, "knee", &seat.knee);
    let angle = seat.knee_angle();
    if angle.is_finite() {
        warn_outside(&mut v, "angle", angle, 0.0, PI);
    } else {
        v.push_error(format!("angle must be finite (got {angle})"));
    }
    v
}

#[cfg(test)]
mod tests {
    use omi_common::Defaulted;

    use super::*;

    fn titled(len: usize) -> SpawnPointJson {
        SpawnPointJson {
            title: Some("x".repeat(len)),
            ..Default::default()
        }
    }

    #[test]
    fn title_boundary() {
        assert!(validate_spawn_point(&titled(128)).is_valid());
        let v = validate_spawn_point(&titled(129));
        assert!(!v.is_valid());
        assert!(v.warnings().is_empty());
    }

    #[test]
    fn length_counts_characters() {
        let spawn = SpawnPointJson {
            team: Some("é".repeat(128)),
            ..Default::default()
        };
        assert!(validate_spawn_point(&spawn).is_valid());
    }

    #[test]
    fn link_requires_uri() {
        assert!(!validate_link(&LinkJson::default()).is_valid());
        assert!(validate_link(&LinkJson {
            uri: "https://example.com".into(),
            title: None
        })
        .is_valid());
    }

    #[test]
    fn personality_requires_fields() {
        let v = validate_personality(&PersonalityJson {
            agent: "Guide".into(),
            ..Default::default()
        });
        assert_eq!(v.errors(), ["personality is required"]);
    }

    #[test]
    fn seat_angle_is_a_warning() {
        let seat = SeatJson {
            angle: Defaulted::Specified(4.0),
            ..Default::default()
        };
        let v = validate_seat(&seat);
        assert!(v.is_valid());
        assert_eq!(v.warnings().len(), 1);
        assert!(validate_seat(&SeatJson::default()).warnings().is_empty());
    }
}
