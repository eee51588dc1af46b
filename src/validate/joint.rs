use crate::{
    data::{JointDrive, JointJson, JointLimit, JointSettings},
    validate::{check_non_negative, Validation},
};

/// Bounds check of a node-level joint against the document it lives in.
///
/// `max_node_index` is the largest valid node index; `settings_count` is the length of the
/// document `physicsJoints` array.
pub fn validate_joint(joint: &JointJson, max_node_index: usize, settings_count: usize) -> Validation {
    let mut v = Validation::new();
    let node_ok = usize::try_from(joint.connected_node).map_or(false, |n| n <= max_node_index);
    if !node_ok {
        v.push_error(format!(
            "connectedNode {} is outside the document's nodes (0..={max_node_index})",
            joint.connected_node
        ));
    }
    let settings_ok = usize::try_from(joint.joint).map_or(false, |j| j < settings_count);
    if !settings_ok {
        v.push_error(format!(
            "joint {} is outside the document's {settings_count} joint settings",
            joint.joint
        ));
    }
    v
}

fn check_axis(v: &mut Validation, field: &str, axis: i64) {
    if !(0..=2).contains(&axis) {
        v.push_error(format!("{field} {axis} is not an axis (0, 1 or 2)"));
    }
}

pub fn validate_joint_limit(limit: &JointLimit) -> Validation {
    let mut v = Validation::new();
    for axis in &limit.linear_axes {
        check_axis(&mut v, "linearAxes", *axis);
    }
    for axis in &limit.angular_axes {
        check_axis(&mut v, "angularAxes", *axis);
    }
    if limit.linear_axes.is_empty() && limit.angular_axes.is_empty() {
        v.push_warning("limit constrains no axes");
    }
    if let (Some(min), Some(max)) = (limit.min, limit.max) {
        if min > max {
            v.push_error(format!("min ({min}) is greater than max ({max})"));
        }
    }
    if let Some(stiffness) = limit.stiffness {
        check_non_negative(&mut v, "stiffness", stiffness);
    }
    if let Some(damping) = limit.damping.as_option() {
        check_non_negative(&mut v, "damping", *damping);
    }
    v
}

pub fn validate_joint_drive(drive: &JointDrive) -> Validation {
    let mut v = Validation::new();
    check_axis(&mut v, "axis", drive.axis);
    if let Some(max_force) = drive.max_force {
        check_non_negative(&mut v, "maxForce", max_force);
    }
    if let Some(stiffness) = drive.stiffness.as_option() {
        check_non_negative(&mut v, "stiffness", *stiffness);
    }
    if let Some(damping) = drive.damping.as_option() {
        check_non_negative(&mut v, "damping", *damping);
    }
    if drive.position_target.is_some() && drive.stiffness.resolve(0.0) == 0.0 {
        v.push_warning("drive has a position target but no stiffness");
    }
    v
}

pub fn validate_joint_settings(settings: &JointSettings) -> Validation {
    let limits = settings
        .limits
        .iter()
        .enumerate()
        .map(|(i, l)| validate_joint_limit(l).with_context(format!("limits[{i}]")));
    let drives = settings
        .drives
        .iter()
        .enumerate()
        .map(|(i, d)| validate_joint_drive(d).with_context(format!("drives[{i}]")));
    limits.chain(drives).fold(Validation::new(), Validation::merge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(connected_node: i64, joint: i64) -> JointJson {
        JointJson {
            connected_node,
            joint,
            enable_collision: false,
        }
    }

    #[test]
    fn bounds() {
        assert!(validate_joint(&joint(4, 0), 4, 1).is_valid());
        assert!(!validate_joint(&joint(5, 0), 4, 1).is_valid());
        assert!(!validate_joint(&joint(-1, 0), 4, 1).is_valid());
        assert!(!validate_joint(&joint(0, 1), 4, 1).is_valid());
    }

    #[test]
    fn limits() {
        let bad = JointLimit {
            angular_axes: vec![3],
            min: Some(1.0),
            max: Some(-1.0),
            ..Default::default()
        };
        let v = validate_joint_settings(&JointSettings {
            limits: vec![JointLimit::default(), bad],
            drives: vec![],
        });
        assert_eq!(v.errors().len(), 2);
        assert!(v.errors().iter().all(|e| e.starts_with("limits[1]")));
        assert_eq!(v.warnings(), ["limits[0]: limit constrains no axes"]);
    }
}
